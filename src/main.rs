use gpumon::frame::snapshot_frame;
use gpumon::utils::logger::setup_logger;
use gpumon::{
    CommandExecutor, DummyGpu, MonitoringError, NvidiaSmi, ProcessEngine, ProcessMonitor,
    SamplerConfig, SignalTerminator,
};
use log::{error, info};
use std::sync::Arc;

const DUMMY_ENV: &str = "GPUMON_DUMMY";
const DURATION_ENV: &str = "GPUMON_DURATION";

async fn run<E: CommandExecutor>(
    config: SamplerConfig,
    executor: E,
    seconds: u64,
) -> Result<(), MonitoringError> {
    let engine = ProcessEngine::new(&config, executor, SignalTerminator);

    // Stand-in display layer: print the table whenever a new snapshot lands.
    let store = Arc::clone(engine.store());
    engine.sampler().subscribe(move || {
        let snapshot = store.snapshot();
        match snapshot_frame(&snapshot.records) {
            Ok(frame) => info!("Snapshot {}:\n{}", snapshot.generation, frame),
            Err(e) => error!("Failed to render snapshot: {}", e),
        }
    });

    let mut monitor = ProcessMonitor::new(Arc::clone(engine.sampler()), config.interval()?);
    monitor.commence().await?;

    info!("Monitoring for {} seconds...", seconds);
    tokio::time::sleep(tokio::time::Duration::from_secs(seconds)).await;

    info!("Shutting down monitoring...");
    monitor.shutdown();
    info!(
        "{} failed cycles, {} processes in last snapshot",
        monitor.failed_cycles(),
        engine.store().len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    setup_logger();
    info!("Application started");

    let config = SamplerConfig::from_env();
    let seconds = std::env::var(DURATION_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    let use_dummy = std::env::var(DUMMY_ENV).is_ok_and(|v| v == "1");

    let result = if use_dummy {
        info!("Using synthetic GPU processes");
        run(config, DummyGpu::default(), seconds).await
    } else {
        run(config, NvidiaSmi::default(), seconds).await
    };

    match result {
        Ok(()) => info!("Program ended successfully."),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
