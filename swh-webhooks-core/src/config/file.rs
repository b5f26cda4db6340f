//! Configuration file structures.
//!
//! The file is shared with the other Software Heritage services, so only
//! the `webhooks` section is read and anything else is ignored:
//!
//! ```yaml
//! webhooks:
//!   svix:
//!     server_url: http://localhost:8071
//!     auth_token: <token>
//!   event_retention_period: 90
//! ```

use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub webhooks: WebhooksSection,
}

/// `webhooks` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhooksSection {
    #[serde(default)]
    pub svix: SvixSection,
    /// Number of days Svix keeps the payload of sent events.
    #[serde(default)]
    pub event_retention_period: Option<u32>,
}

/// `webhooks.svix` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvixSection {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parsing_ignores_other_sections() {
        let yaml = r#"
storage:
  cls: remote
  url: http://storage:5002/
webhooks:
  svix:
    server_url: http://localhost:8071
    auth_token: secret-token
  event_retention_period: 30
"#;
        let config: FileConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.webhooks.svix.server_url.as_deref(),
            Some("http://localhost:8071")
        );
        assert_eq!(config.webhooks.svix.auth_token.as_deref(), Some("secret-token"));
        assert_eq!(config.webhooks.event_retention_period, Some(30));
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[webhooks.svix]
server_url = "http://localhost:8071"
auth_token = "secret-token"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.webhooks.svix.auth_token.as_deref(), Some("secret-token"));
        assert_eq!(config.webhooks.event_retention_period, None);
    }

    #[test]
    fn test_empty_file() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }
}
