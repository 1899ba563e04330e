use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use meshrig::harness::{Harness, ShutdownSignal};
use meshrig::{telemetry, HarnessConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let config = HarnessConfig::parse();

    if let Err(e) = telemetry::init(&config.log_filter, config.log_format) {
        eprintln!("meshrig: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("failed to start: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: HarnessConfig) -> anyhow::Result<()> {
    let shutdown = ShutdownSignal::install()?;

    let harness = Harness::new(config);
    let _running = harness.start_all()?;

    let signal = shutdown.wait().await;
    info!(%signal, "received signal, exiting");
    Ok(())
}
