//! Configuration loading.
//!
//! Handles loading configuration from YAML or TOML files, the
//! `SWH_CONFIG_FILENAME` environment variable and explicit overrides coming
//! from the command line.

pub mod file;

use std::path::{Path, PathBuf};

use swh_webhooks_sdk::config::{DEFAULT_EVENT_RETENTION_PERIOD, SvixConfig, WebhooksConfig};
use thiserror::Error;
use url::Url;

use crate::config::file::FileConfig;

/// Environment variable naming the configuration file. It takes precedence
/// over the path given to [`ConfigLoader`].
pub const CONFIG_FILENAME_ENV: &str = "SWH_CONFIG_FILENAME";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to parse config file: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Svix authentication token is missing")]
    MissingAuthToken,

    #[error("Svix server URL is missing")]
    MissingServerUrl,

    #[error("invalid Svix server URL {url:?}: {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Configuration loader: file first, explicit values as fallback.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    svix_server_url: Option<String>,
    svix_auth_token: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: Option<impl AsRef<Path>>) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// URL of the Svix server, used if not provided in the configuration file.
    pub fn with_svix_server_url(mut self, url: Option<String>) -> Self {
        self.svix_server_url = url;
        self
    }

    /// Svix bearer token, used if not provided in the configuration file.
    pub fn with_svix_auth_token(mut self, token: Option<String>) -> Self {
        self.svix_auth_token = token;
        self
    }

    /// Load and validate the configuration.
    ///
    /// This will:
    /// 1. Pick the file from `SWH_CONFIG_FILENAME` or the configured path
    /// 2. Read it, if any
    /// 3. Fill the Svix settings missing from the file with the explicit values
    /// 4. Validate the result
    pub fn load(&self) -> Result<WebhooksConfig, ConfigError> {
        let env_path = std::env::var_os(CONFIG_FILENAME_ENV).map(PathBuf::from);
        let file_config = match self.resolve_path(env_path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Reading configuration file");
                read_file_config(&path)?
            }
            None => FileConfig::default(),
        };
        self.build(file_config)
    }

    fn resolve_path(&self, env_path: Option<PathBuf>) -> Option<PathBuf> {
        env_path
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| self.config_path.clone())
    }

    /// Merge a parsed file with the explicit values.
    pub fn build(&self, file_config: FileConfig) -> Result<WebhooksConfig, ConfigError> {
        let section = file_config.webhooks;
        let auth_token = non_empty(section.svix.auth_token)
            .or_else(|| non_empty(self.svix_auth_token.clone()))
            .ok_or(ConfigError::MissingAuthToken)?;
        let server_url = non_empty(section.svix.server_url)
            .or_else(|| non_empty(self.svix_server_url.clone()))
            .ok_or(ConfigError::MissingServerUrl)?;
        let server_url = Url::parse(&server_url)
            .map_err(|source| ConfigError::InvalidServerUrl {
                url: server_url.clone(),
                source,
            })?;

        Ok(WebhooksConfig {
            svix: SvixConfig::new(server_url, auth_token),
            event_retention_period: section
                .event_retention_period
                .unwrap_or(DEFAULT_EVENT_RETENTION_PERIOD),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Read a configuration file, TOML if its extension says so, YAML otherwise.
pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        Ok(toml::from_str(&content)?)
    } else if content.trim().is_empty() {
        Ok(FileConfig::default())
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{SvixSection, WebhooksSection};
    use std::io::Write;

    fn file_with(server_url: Option<&str>, auth_token: Option<&str>) -> FileConfig {
        FileConfig {
            webhooks: WebhooksSection {
                svix: SvixSection {
                    server_url: server_url.map(str::to_owned),
                    auth_token: auth_token.map(str::to_owned),
                },
                event_retention_period: None,
            },
        }
    }

    #[test]
    fn test_missing_token() {
        let err = ConfigLoader::default()
            .build(FileConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Svix authentication token is missing");
    }

    #[test]
    fn test_missing_server_url() {
        let err = ConfigLoader::default()
            .with_svix_auth_token(Some("token".to_owned()))
            .build(FileConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Svix server URL is missing");
    }

    #[test]
    fn test_explicit_values() {
        let config = ConfigLoader::default()
            .with_svix_server_url(Some("http://localhost:8071".to_owned()))
            .with_svix_auth_token(Some("token".to_owned()))
            .build(FileConfig::default())
            .unwrap();
        assert_eq!(config.svix.server_url.as_str(), "http://localhost:8071/");
        assert_eq!(config.svix.auth_token, "token");
        assert_eq!(config.event_retention_period, DEFAULT_EVENT_RETENTION_PERIOD);
    }

    #[test]
    fn test_file_takes_precedence() {
        let config = ConfigLoader::default()
            .with_svix_server_url(Some("http://other:8071".to_owned()))
            .with_svix_auth_token(Some("other".to_owned()))
            .build(file_with(Some("http://svix:8071"), Some("token")))
            .unwrap();
        assert_eq!(config.svix.server_url.as_str(), "http://svix:8071/");
        assert_eq!(config.svix.auth_token, "token");
    }

    #[test]
    fn test_empty_values_are_missing() {
        let config = ConfigLoader::default()
            .with_svix_auth_token(Some("token".to_owned()))
            .with_svix_server_url(Some("http://svix:8071".to_owned()))
            .build(file_with(Some(""), Some("")))
            .unwrap();
        assert_eq!(config.svix.auth_token, "token");
    }

    #[test]
    fn test_invalid_url() {
        let err = ConfigLoader::default()
            .build(file_with(Some("not a url"), Some("token")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServerUrl { .. }));
    }

    #[test]
    fn test_env_path_wins() {
        let loader = ConfigLoader::new(Some("/etc/swh/webhooks.yml"));
        assert_eq!(
            loader.resolve_path(Some(PathBuf::from("/tmp/other.yml"))),
            Some(PathBuf::from("/tmp/other.yml"))
        );
        assert_eq!(
            loader.resolve_path(Some(PathBuf::new())),
            Some(PathBuf::from("/etc/swh/webhooks.yml"))
        );
        assert_eq!(ConfigLoader::default().resolve_path(None), None);
    }

    #[test]
    fn test_read_yaml_and_toml_files() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("webhooks.yml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(
            f,
            "webhooks:\n  svix:\n    server_url: http://svix:8071\n    auth_token: token"
        )
        .unwrap();
        let config = read_file_config(&yaml_path).unwrap();
        assert_eq!(config, file_with(Some("http://svix:8071"), Some("token")));

        let toml_path = dir.path().join("webhooks.toml");
        std::fs::write(
            &toml_path,
            "[webhooks]\nevent_retention_period = 7\n[webhooks.svix]\nauth_token = \"token\"\n",
        )
        .unwrap();
        let config = read_file_config(&toml_path).unwrap();
        assert_eq!(config.webhooks.event_retention_period, Some(7));

        let missing = dir.path().join("missing.yml");
        assert!(matches!(
            read_file_config(&missing),
            Err(ConfigError::IoError { .. })
        ));
    }
}
