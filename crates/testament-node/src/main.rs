//! # Testament Node
//!
//! Entry point for the testament runtime. Startup sequence:
//!
//! 1. Initialize structured logging (filter from `TESTAMENT_LOG`).
//! 2. Load configuration from defaults plus environment overrides.
//! 3. Wire the event log/bus, lifecycle service, projection engine, and
//!    query gateway.
//! 4. Run until Ctrl+C, then shut down gracefully.

use anyhow::Result;
use testament_node::{load_config, TestamentRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("TESTAMENT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = load_config();
    let mut runtime = TestamentRuntime::new(config)?;
    runtime.start()?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
