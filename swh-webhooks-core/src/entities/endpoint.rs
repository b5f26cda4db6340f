use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::gen_uuid;

/// Webhook user endpoint definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// URL of the endpoint to receive webhook messages.
    pub url: String,
    /// The type of event the endpoint receives.
    pub event_type_name: String,
    /// Optional channel this endpoint listens to. Channels are an extra
    /// dimension of filtering messages, orthogonal to event types.
    #[serde(default)]
    pub channel: Option<String>,
    /// Optional metadata associated to the endpoint.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, event_type_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            event_type_name: event_type_name.into(),
            channel: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Unique identifier of the endpoint in its Svix application.
    ///
    /// A missing channel is rendered as `None` so that identifiers of
    /// endpoints registered by earlier deployments stay stable.
    pub fn uid(&self) -> String {
        gen_uuid(&format!(
            "{}-{}-{}",
            self.event_type_name,
            self.url,
            self.channel.as_deref().unwrap_or("None")
        ))
    }

    /// Channel name as sent to Svix.
    pub fn channel_uid(&self) -> Option<String> {
        self.channel.as_deref().map(gen_uuid)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint with url {} ", self.url)?;
        if let Some(channel) = &self.channel {
            write!(f, "and channel {channel} ")?;
        }
        write!(f, "for event type {}", self.event_type_name)
    }
}
