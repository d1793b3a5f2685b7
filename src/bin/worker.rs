#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = ielts_platform::run_worker().await {
        eprintln!("ielts-worker fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
