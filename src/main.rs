#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = ielts_platform::run().await {
        eprintln!("ielts-platform fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
