use admintime_tracker::config::Config;
use admintime_tracker::helpers::now;
use admintime_tracker::host::HostEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Reads newline-delimited JSON host events from stdin until EOF.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = "debug";
    #[cfg(not(debug_assertions))]
    let log_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting admin time tracker...");

    let config = Config::from_env();
    tracing::info!(
        "Configuration: server_id={}, database={}, admins={}, write_queue={}",
        config.server_id,
        config.database_url,
        config.admins_path,
        config.write_queue_capacity
    );

    let router = admintime_tracker::start(&config).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => router.dispatch(event, now()).await,
            Err(e) => tracing::warn!(error = %e, "skipping malformed host event"),
        }
    }

    tracing::info!("Event source closed, flushing pending writes");
    router.shutdown().await;
    Ok(())
}
