//! Webhooks management.
//!
//! Svix is used with the following conventions:
//! - one application per event type, named after it, gathering every
//!   endpoint that receives it
//! - endpoint uids derived from the event type, URL and channel so that
//!   creating an endpoint twice is harmless
//! - channel names replaced by their UUID, the mapping being kept in the
//!   endpoint metadata
//! - payloads validated against the event-type schema before being sent

mod endpoints;
mod event_types;
mod events;

use swh_webhooks_sdk::client::{ClientError, SvixClient};
use swh_webhooks_sdk::config::WebhooksConfig;
use swh_webhooks_sdk::signature::SignatureError;
use swh_webhooks_sdk::{EventTypeError, PayloadValidationError};
use thiserror::Error;

use crate::config::{ConfigError, ConfigLoader};
use crate::entities::Endpoint;

/// Header added to every delivery, holding the event type name.
pub const SWH_EVENT_HEADER: &str = "X-Swh-Event";

/// Svix error code of an already registered event type.
const EVENT_TYPE_EXISTS: &str = "event_type_exists";

/// Svix error code of an already existing endpoint uid.
const CONFLICT: &str = "conflict";

#[derive(Debug, Error)]
pub enum WebhooksError {
    #[error("Event type {0} does not exist")]
    EventTypeNotFound(String),

    #[error("Event type {0} is archived")]
    EventTypeArchived(String),

    #[error("{0} does not exist")]
    EndpointNotFound(Endpoint),

    #[error(transparent)]
    EventType(#[from] EventTypeError),

    #[error(transparent)]
    Payload(#[from] PayloadValidationError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Map a `not_found` answer of the Svix server to a domain error.
fn or_not_found(err: ClientError, not_found: impl FnOnce() -> WebhooksError) -> WebhooksError {
    if err.is_not_found() {
        not_found()
    } else {
        WebhooksError::Client(err)
    }
}

/// Software Heritage webhooks management built on top of a Svix server.
#[derive(Debug, Clone)]
pub struct Webhooks {
    client: SvixClient,
    config: WebhooksConfig,
}

impl Webhooks {
    pub fn new(config: WebhooksConfig) -> Self {
        Self {
            client: SvixClient::new(&config.svix),
            config,
        }
    }

    /// Load the configuration and connect to the Svix server it names.
    pub fn from_loader(loader: &ConfigLoader) -> Result<Self, ConfigError> {
        Ok(Self::new(loader.load()?))
    }

    /// Use a preconfigured Svix client.
    pub fn with_client(mut self, client: SvixClient) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &WebhooksConfig {
        &self.config
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};
    use swh_webhooks_sdk::config::SvixConfig;
    use swh_webhooks_sdk::events::origin_visit;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn webhooks_for(server: &MockServer) -> Webhooks {
        let url = Url::parse(&server.uri()).unwrap();
        Webhooks::new(WebhooksConfig::new(SvixConfig::new(url, "test-token")))
    }

    pub(crate) fn event_type_json(name: &str, archived: bool) -> Value {
        json!({
            "name": name,
            "description": "test event type",
            "schemas": {"1": origin_visit::schema()},
            "archived": archived,
            "createdAt": "2023-01-01T00:00:00Z",
            "updatedAt": "2023-01-01T00:00:00Z"
        })
    }

    pub(crate) async fn mount_event_type(server: &MockServer, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/event-type/{name}/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_type_json(name, false)))
            .mount(server)
            .await;
    }

    pub(crate) fn svix_error(status: u16, code: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_json(json!({"code": code, "detail": "error detail"}))
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WebhooksError::EventTypeNotFound("origin.create".to_owned()).to_string(),
            "Event type origin.create does not exist"
        );
        assert_eq!(
            WebhooksError::EventTypeArchived("origin.visit".to_owned()).to_string(),
            "Event type origin.visit is archived"
        );
        let endpoint = Endpoint::new("https://example.org/webhook", "origin.visit");
        assert_eq!(
            WebhooksError::EndpointNotFound(endpoint).to_string(),
            "Endpoint with url https://example.org/webhook for event type origin.visit does not exist"
        );
    }

    #[test]
    fn test_config_is_kept() {
        let url = Url::parse("http://svix:8071").unwrap();
        let mut config = WebhooksConfig::new(SvixConfig::new(url, "token"));
        config.event_retention_period = 7;
        let webhooks = Webhooks::new(config.clone());
        assert_eq!(webhooks.config(), &config);
    }
}
