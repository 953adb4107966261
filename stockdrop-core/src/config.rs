//! YAML settings file.
//!
//! # Location
//!
//! ```text
//! <config_dir>/stockdrop/config.yaml   (default; override with --config)
//! ```
//!
//! Every key is optional. A missing file yields [`Settings::default`], which
//! matches the container deployment: FTP drops land in `/uploads` and
//! credentials are mounted as Docker secrets under `/run/secrets`.
//!
//! # API pattern
//!
//! - `load_at(path)` — explicit path; used in tests with `TempDir`
//! - `load()` — derives the path from `dirs::config_dir()`, delegates to `load_at`

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::headers::default_header_mapping;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Remote store connection settings. Credentials themselves live in secret files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifySettings {
    pub api_version: String,
    /// Overrides the `shop_domain_secret` file when set.
    pub shop_domain: Option<String>,
    pub secrets_dir: PathBuf,
    pub access_token_secret: String,
    pub shop_domain_secret: String,
}

impl Default for ShopifySettings {
    fn default() -> Self {
        Self {
            api_version: "2025-07".to_string(),
            shop_domain: None,
            secrets_dir: PathBuf::from("/run/secrets"),
            access_token_secret: "shopify_access_token".to_string(),
            shop_domain_secret: "shopify_shop_domain".to_string(),
        }
    }
}

/// Effective daemon settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub watch_dir: PathBuf,
    /// Prefix proftpd's `HiddenStores` gives files while they are still being written.
    pub temp_prefix: String,
    pub debounce_ms: u64,
    pub retention_days: u64,
    pub sweep_interval_secs: u64,
    pub mime_type: String,
    pub label: String,
    pub stage_retries: u32,
    pub log_format: LogFormat,
    /// Secret holding the Sentry DSN, read from `shopify.secrets_dir`.
    /// `null` turns error reporting off.
    pub sentry_dsn_secret: Option<String>,
    pub shopify: ShopifySettings,
    pub header_mapping: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("/uploads"),
            temp_prefix: ".in.".to_string(),
            debounce_ms: 500,
            retention_days: 15,
            sweep_interval_secs: 60 * 60,
            mime_type: "text/csv".to_string(),
            label: "Stock feed".to_string(),
            stage_retries: 2,
            log_format: LogFormat::Text,
            sentry_dsn_secret: Some("sentry_dsn".to_string()),
            shopify: ShopifySettings::default(),
            header_mapping: default_header_mapping(),
        }
    }
}

impl Settings {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retention_age(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(SECONDS_PER_DAY))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Reject values the watcher or sweeper cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temp_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "temp_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "debounce_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.retention_days == 0 {
            return Err(ConfigError::Invalid {
                field: "retention_days",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Render as YAML for `stockdrop config`.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// `<config_dir>/stockdrop/config.yaml` — pure, no I/O.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stockdrop").join("config.yaml"))
}

/// Load settings from `path`. A missing file yields the defaults.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Settings, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
        Err(err) => return Err(io_err(path, err)),
    };
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `load_at` convenience wrapper; defaults when no config directory exists.
pub fn load() -> Result<Settings, ConfigError> {
    match default_config_path() {
        Some(path) => load_at(&path),
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let settings = load_at(&dir.path().join("absent.yaml")).expect("load");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.debounce_window(), Duration::from_millis(500));
        assert_eq!(settings.retention_age(), Duration::from_secs(15 * 86_400));
    }

    #[test]
    fn partial_file_keeps_unset_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "watch_dir: /srv/ftp/drop\nretention_days: 3\nshopify:\n  shop_domain: shop.example.com\n",
        )
        .expect("write");

        let settings = load_at(&path).expect("load");
        assert_eq!(settings.watch_dir, PathBuf::from("/srv/ftp/drop"));
        assert_eq!(settings.retention_days, 3);
        assert_eq!(settings.temp_prefix, ".in.");
        assert_eq!(settings.stage_retries, 2);
        assert_eq!(
            settings.shopify.shop_domain.as_deref(),
            Some("shop.example.com")
        );
        assert_eq!(settings.shopify.api_version, "2025-07");
    }

    #[test]
    fn json_log_format_parses_lowercase() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "log_format: json\n").expect("write");
        assert_eq!(load_at(&path).expect("load").log_format, LogFormat::Json);
    }

    #[test]
    fn null_sentry_secret_disables_error_reporting() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sentry_dsn_secret: null\n").expect("write");
        assert_eq!(load_at(&path).expect("load").sentry_dsn_secret, None);
        assert_eq!(
            Settings::default().sentry_dsn_secret.as_deref(),
            Some("sentry_dsn")
        );
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let settings = Settings {
            debounce_ms: 0,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("debounce_ms"), "got: {err}");
    }

    #[test]
    fn default_settings_are_valid() {
        Settings::default().validate().expect("defaults validate");
    }
}
