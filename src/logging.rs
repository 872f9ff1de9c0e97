//! Logging setup for programs built on this crate.
//!
//! The library itself only emits `tracing` events under the
//! `redshift_data_client` target. Binaries that want them printed call
//! [`init_logging_from_env`] (or [`init_logging`] with an explicit config)
//! once at startup.
//!
//! An explicit level wins over `RUST_LOG`; without either, warnings and
//! errors are shown.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const TARGET: &str = "redshift_data_client";

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log level: "OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE".
    pub level: Option<String>,
    /// Appends to this file instead of writing to stderr.
    pub file: Option<String>,
}

impl LogConfig {
    /// Reads `REDSHIFT_LOG_LEVEL` and `REDSHIFT_LOG_FILE`.
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("REDSHIFT_LOG_LEVEL").ok(),
            file: std::env::var("REDSHIFT_LOG_FILE").ok(),
        }
    }

    fn is_off(&self) -> bool {
        self.level
            .as_deref()
            .is_some_and(|level| level.eq_ignore_ascii_case("off"))
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(ref level) => EnvFilter::new(format!("{}={}", TARGET, level.to_lowercase())),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", TARGET))),
        }
    }

    fn writer(&self) -> io::Result<BoxMakeWriter> {
        match self.file {
            Some(ref path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(BoxMakeWriter::new(Mutex::new(file)))
            }
            None => Ok(BoxMakeWriter::new(io::stderr)),
        }
    }
}

/// Installs a global subscriber for `config`.
///
/// Does nothing when the level is `off` or another subscriber is already
/// installed. Fails only when the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if config.is_off() {
        return Ok(());
    }

    let layer = fmt::layer()
        .with_writer(config.writer()?)
        .with_target(false)
        .with_ansi(config.file.is_none());

    if tracing_subscriber::registry()
        .with(config.filter())
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("A global subscriber is already installed");
    }
    Ok(())
}

/// [`init_logging`] with [`LogConfig::from_env`].
pub fn init_logging_from_env() -> io::Result<()> {
    init_logging(&LogConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.level.is_none());
        assert!(config.file.is_none());
        assert!(!config.is_off());
    }

    #[test]
    fn test_off_level_is_case_insensitive() {
        let config = LogConfig {
            level: Some("OFF".to_string()),
            file: None,
        };
        assert!(config.is_off());
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_explicit_level_scopes_filter_to_crate() {
        let config = LogConfig {
            level: Some("DEBUG".to_string()),
            file: None,
        };
        assert!(config.filter().to_string().contains("redshift_data_client"));
    }

    #[test]
    fn test_log_file_is_created() {
        let path = std::env::temp_dir().join(format!(
            "redshift-data-client-log-{}.log",
            std::process::id()
        ));
        let config = LogConfig {
            level: None,
            file: Some(path.to_string_lossy().into_owned()),
        };

        assert!(config.writer().is_ok());
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unopenable_log_file_is_an_error() {
        let config = LogConfig {
            level: Some("info".to_string()),
            file: Some("/nonexistent-dir/redshift/client.log".to_string()),
        };
        assert!(init_logging(&config).is_err());
    }
}
