use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{interval, Duration};

use crate::core::state::AppState;
use crate::tasks::maintenance;

const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(300);

pub(crate) async fn run(state: AppState) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handles = vec![tokio::spawn(maintenance_loop(state.clone(), shutdown_rx.clone()))];
    tracing::info!(interval_secs = MAINTENANCE_INTERVAL.as_secs(), "Worker started");

    crate::core::shutdown::shutdown_signal().await;
    if shutdown_tx.send(true).is_err() {
        tracing::warn!("Failed to broadcast shutdown signal to background tasks");
    }

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Background task join failed");
        }
    }

    tracing::info!("Worker stopped");
    Ok(())
}

async fn maintenance_loop(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let mut tick = interval(MAINTENANCE_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if let Err(err) = maintenance::purge_expired(&state).await {
                    tracing::error!(error = %err, "purge_expired failed");
                }
            }
        }
    }
}
