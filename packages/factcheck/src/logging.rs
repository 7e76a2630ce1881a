//! Tracing setup for the binary.
//!
//! With logging enabled, events at the configured level go to stderr and to
//! a timestamped file under the log directory. Otherwise only warnings are
//! printed. `RUST_LOG` overrides the level either way.

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// File name for a run's log, e.g. `api_requests_20250301_142530.log`.
pub fn log_file_name(now: chrono::DateTime<Local>) -> String {
    format!("api_requests_{}.log", now.format("%Y%m%d_%H%M%S"))
}

fn default_filter(config: &LoggingConfig) -> String {
    if config.enabled {
        format!("{},hyper=warn,reqwest=warn", config.level)
    } else {
        "warn".to_string()
    }
}

/// Install the global subscriber. Returns the log file path when file
/// logging is active.
pub fn init(config: &LoggingConfig) -> io::Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let (file_layer, path) = if config.enabled {
        fs::create_dir_all(&config.dir)?;
        let path = config.dir.join(log_file_name(Local::now()));
        let file = File::create(&path)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(file));
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 14, 25, 30).unwrap();
        assert_eq!(log_file_name(at), "api_requests_20250301_142530.log");
    }

    #[test]
    fn test_default_filter() {
        let mut config = LoggingConfig::default();
        config.enabled = false;
        assert_eq!(default_filter(&config), "warn");

        config.enabled = true;
        config.level = "debug".into();
        assert!(default_filter(&config).starts_with("debug,"));
    }
}
