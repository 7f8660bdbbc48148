//! Runtime configuration, read from an optional TOML file.
//!
//! Every key is optional:
//!
//! ```toml
//! output_dir = "qr-codes"
//! format = "svg"
//! notification_timeout_ms = 3000
//! jpeg_quality = 92
//! log_filter = "scannix=debug"
//! ```
//!
//! The render defaults (300px, margin 2, level M, black on white) are fixed and cannot be
//! configured: resetting the form always returns to them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::encoder::DEFAULT_JPEG_QUALITY;
use crate::error::ConfigError;
use crate::notification::DEFAULT_TIMEOUT;
use crate::options::ExportFormat;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory downloads are written to.
    pub output_dir: PathBuf,
    /// Initially selected download format.
    pub format: ExportFormat,
    /// How long a notification stays visible.
    pub notification_timeout_ms: u64,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// `tracing-subscriber` filter directive, overridden by `RUST_LOG`.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: PathBuf::from("."),
            format: ExportFormat::Png,
            notification_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            log_filter: None,
        }
    }
}

impl Config {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.notification_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn load_reads_every_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
output_dir = "out/qr"
format = "JPEG"
notification_timeout_ms = 1500
jpeg_quality = 75
log_filter = "scannix=debug"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out/qr"));
        assert_eq!(config.format, ExportFormat::Jpeg);
        assert_eq!(config.notification_timeout(), Duration::from_millis(1500));
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.log_filter.as_deref(), Some("scannix=debug"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(toml::from_str::<Config>("width = 400").is_err());
        assert!(toml::from_str::<Config>("format = \"gif\"").is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "jpeg_quality = 0").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load("/nonexistent/scannix.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
