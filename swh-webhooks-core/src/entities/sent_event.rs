use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// A webhook delivery attempt, as seen by the receiving endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentEvent {
    /// The type of sent event.
    pub event_type_name: String,
    /// The URL of the targeted endpoint.
    pub endpoint_url: String,
    /// The channel associated to the endpoint.
    pub channel: Option<String>,
    /// HTTP headers sent with the POST request.
    pub headers: BTreeMap<String, String>,
    /// Svix message identifier.
    pub msg_id: String,
    /// JSON payload sent as POST request body.
    pub payload: Value,
    /// The date the request was sent.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// The response sent by the endpoint.
    pub response: String,
    /// The status code of the POST request.
    pub response_status_code: i32,
}
