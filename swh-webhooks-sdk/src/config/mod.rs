//! Runtime configuration types.
//!
//! These types represent validated configuration shared across crates. The
//! configuration file loading is handled by `swh-webhooks-core`.

use url::Url;

/// Default number of days Svix keeps message payloads.
pub const DEFAULT_EVENT_RETENTION_PERIOD: u32 = 90;

/// Connection settings of the Svix server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvixConfig {
    /// Root URL of the Svix server (e.g. `http://localhost:8071`).
    pub server_url: Url,
    /// Bearer token used to authenticate against the Svix REST API.
    pub auth_token: String,
}

impl SvixConfig {
    pub fn new(server_url: Url, auth_token: impl Into<String>) -> Self {
        Self {
            server_url,
            auth_token: auth_token.into(),
        }
    }
}

/// Validated webhooks configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhooksConfig {
    pub svix: SvixConfig,
    /// Number of days Svix keeps the payload of sent events.
    pub event_retention_period: u32,
}

impl WebhooksConfig {
    pub fn new(svix: SvixConfig) -> Self {
        Self {
            svix,
            event_retention_period: DEFAULT_EVENT_RETENTION_PERIOD,
        }
    }
}
