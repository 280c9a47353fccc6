//! Battery Guardian tray daemon entry point.
//!
//! Wires the core monitor loop onto a tokio runtime, then hands the main
//! thread to the tray event loop. Quit (tray menu or OS signal) cancels the
//! shared token, joins the monitor, and exits 0.

mod icon;
mod sink;
mod sound;
mod tray;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use guardian_core::config::GuardianConfig;
use guardian_core::monitor::Monitor;
use guardian_core::power::sensor::BatterySensor;
use guardian_core::shutdown::ShutdownGuard;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = GuardianConfig::load()?;
    tracing::info!(
        full = cfg.full_threshold,
        high = cfg.high_threshold,
        low = cfg.low_threshold,
        poll_interval_secs = cfg.poll_interval_secs,
        "configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let shutdown = ShutdownGuard::new();
    {
        let _guard = runtime.enter();
        shutdown.spawn_signal_listener();
    }
    let cancel = shutdown.token();

    let (monitor, status_rx) = Monitor::new(
        cfg.clone(),
        Box::new(BatterySensor::new()),
        Arc::new(sink::DesktopSink),
    );
    let monitor_task = runtime.spawn(monitor.run(cancel.clone()));

    tray::TrayApp::new(cfg, status_rx, cancel, runtime, monitor_task).run()
}
