use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::{DateTime, Local};
use tracing_subscriber::EnvFilter;

/// `<prefix>_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_path(prefix: &str, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("{}_{}.log", prefix, now.format("%Y%m%d_%H%M%S")))
}

/// Plain-text subscriber appending the tester's events to `path`.
pub fn file_subscriber(
    path: &Path,
    debug: bool,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    let filter = if debug { "syncgate=debug" } else { "syncgate=info" };
    Ok(tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish())
}

/// Routes the tester's events to a fresh timestamped log file.
pub fn init_file_logging(prefix: &str, debug: bool) -> anyhow::Result<PathBuf> {
    let path = log_file_path(prefix, Local::now());
    tracing::subscriber::set_global_default(file_subscriber(&path, debug)?)
        .context("install log subscriber")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_carries_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            log_file_path("logs/sync_gateway_log", at),
            PathBuf::from("logs/sync_gateway_log_20240309_070501.log")
        );
    }

    #[test]
    fn debug_flag_controls_level() {
        let dir = tempfile::tempdir().unwrap();
        let quiet = dir.path().join("quiet.log");
        tracing::subscriber::with_default(file_subscriber(&quiet, false).unwrap(), || {
            tracing::info!("kept");
            tracing::debug!("dropped");
        });
        let text = std::fs::read_to_string(&quiet).unwrap();
        assert!(text.contains("kept"));
        assert!(!text.contains("dropped"));
        assert!(!text.contains('\u{1b}'));

        let verbose = dir.path().join("verbose.log");
        tracing::subscriber::with_default(file_subscriber(&verbose, true).unwrap(), || {
            tracing::debug!("shown");
        });
        assert!(std::fs::read_to_string(&verbose).unwrap().contains("shown"));
    }
}
