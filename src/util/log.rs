use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log to a file under the platform data dir; stdout belongs to the TUI.
/// The returned guard must outlive the process body or buffered lines are lost.
pub fn initialize_logging() -> color_eyre::Result<WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "sctui")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("/tmp/sctui/logs"));
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, "sctui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = std::env::var("SCTUI_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new("info,sctui=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    Ok(guard)
}
