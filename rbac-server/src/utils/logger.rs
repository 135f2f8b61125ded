//! Logging Infrastructure
//!
//! `tracing` subscriber setup: human-readable or JSON lines, stdout or a
//! daily rolling file. Security events go out under the `security` target.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let file_dir = log_dir.map(Path::new).filter(|p| p.exists()).and_then(|p| p.to_str());

    // try_init: tests may install a subscriber more than once
    match (file_dir, json) {
        (Some(dir), true) => {
            let appender = tracing_appender::rolling::daily(dir, "rbac-server");
            let _ = builder.json().with_writer(appender).try_init();
        }
        (Some(dir), false) => {
            let appender = tracing_appender::rolling::daily(dir, "rbac-server");
            let _ = builder.with_ansi(false).with_writer(appender).try_init();
        }
        (None, true) => {
            let _ = builder.json().try_init();
        }
        (None, false) => {
            let _ = builder.try_init();
        }
    }
}
