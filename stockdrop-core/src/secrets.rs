//! Docker Swarm secret loading.
//!
//! Secrets are mounted as one file per secret, conventionally under
//! `/run/secrets/<name>`. Values are trimmed of surrounding whitespace.

use std::fmt;
use std::path::Path;

use crate::config::Settings;
use crate::error::ConfigError;

/// Connection credentials for the remote file service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub shop_domain: String,
    pub access_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("shop_domain", &self.shop_domain)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Read `<dir>/<name>` and return its trimmed contents.
pub fn read_secret_at(dir: &Path, name: &str) -> Result<String, ConfigError> {
    let path = dir.join(name);
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::SecretUnreadable {
        name: name.to_string(),
        path: path.clone(),
        source,
    })?;
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::SecretEmpty {
            name: name.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Resolve credentials from settings plus the secrets directory.
pub fn load_credentials(settings: &Settings) -> Result<Credentials, ConfigError> {
    let shopify = &settings.shopify;
    let shop_domain = match shopify.shop_domain.as_deref().map(str::trim) {
        Some(domain) if !domain.is_empty() => domain.to_string(),
        _ => read_secret_at(&shopify.secrets_dir, &shopify.shop_domain_secret)?,
    };
    let access_token = read_secret_at(&shopify.secrets_dir, &shopify.access_token_secret)?;
    Ok(Credentials {
        shop_domain,
        access_token,
    })
}

/// Sentry DSN for error reporting. `Ok(None)` when no secret is configured.
pub fn load_sentry_dsn(settings: &Settings) -> Result<Option<String>, ConfigError> {
    match settings.sentry_dsn_secret.as_deref() {
        Some(name) => read_secret_at(&settings.shopify.secrets_dir, name).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn secret_value_is_trimmed() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("token"), "  shpat_abc\n").expect("write");
        assert_eq!(read_secret_at(dir.path(), "token").expect("read"), "shpat_abc");
    }

    #[test]
    fn missing_secret_names_the_secret() {
        let dir = TempDir::new().expect("tempdir");
        let err = read_secret_at(dir.path(), "shopify_access_token").unwrap_err();
        assert!(matches!(err, ConfigError::SecretUnreadable { .. }), "got: {err}");
        assert!(err.to_string().contains("shopify_access_token"));
    }

    #[test]
    fn whitespace_only_secret_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("token"), "\n\t \n").expect("write");
        let err = read_secret_at(dir.path(), "token").unwrap_err();
        assert!(matches!(err, ConfigError::SecretEmpty { .. }), "got: {err}");
    }

    #[test]
    fn configured_domain_overrides_secret_file() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("shopify_access_token"), "shpat_abc").expect("write");

        let mut settings = Settings::default();
        settings.shopify.secrets_dir = dir.path().to_path_buf();
        settings.shopify.shop_domain = Some("shop.example.com".to_string());

        let creds = load_credentials(&settings).expect("credentials");
        assert_eq!(creds.shop_domain, "shop.example.com");
        assert_eq!(creds.access_token, "shpat_abc");
    }

    #[test]
    fn sentry_dsn_comes_from_its_secret_file() {
        let dir = TempDir::new().expect("tempdir");
        let mut settings = Settings::default();
        settings.shopify.secrets_dir = dir.path().to_path_buf();
        assert!(load_sentry_dsn(&settings).is_err(), "configured but absent");

        std::fs::write(dir.path().join("sentry_dsn"), "https://key@o1.ingest.sentry.io/42\n")
            .expect("write");
        assert_eq!(
            load_sentry_dsn(&settings).expect("dsn").as_deref(),
            Some("https://key@o1.ingest.sentry.io/42")
        );

        settings.sentry_dsn_secret = None;
        assert_eq!(load_sentry_dsn(&settings).expect("unconfigured"), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let creds = Credentials {
            shop_domain: "shop.example.com".to_string(),
            access_token: "shpat_secret".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("shpat_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
