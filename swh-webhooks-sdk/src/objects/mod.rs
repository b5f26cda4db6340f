//! Svix REST API wire objects.
//!
//! Only the fields this project reads or writes are modelled. Svix uses
//! camelCase keys and ignores unknown ones, and so do we.

pub mod application;
pub mod endpoint;
pub mod event_type;
pub mod message;

pub use application::{ApplicationIn, ApplicationOut};
pub use endpoint::{
    EndpointHeadersIn, EndpointIn, EndpointListOptions, EndpointOut, EndpointSecretOut, Ordering,
};
pub use event_type::{EventTypeIn, EventTypeListOptions, EventTypeOut, EventTypeUpdate};
pub use message::{
    EndpointMessageOut, MessageAttemptListOptions, MessageAttemptOut, MessageIn, MessageOut,
};

use serde::{Deserialize, Serialize};

/// Key under which the schema of version 1 of an event type is stored.
pub const SCHEMA_VERSION_KEY: &str = "1";

/// A page of a Svix list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub iterator: Option<String>,
    #[serde(default)]
    pub prev_iterator: Option<String>,
    pub done: bool,
}

/// Error body returned by Svix with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpErrorOut {
    #[serde(default)]
    pub code: String,
    /// A string for most errors, a list of field errors for `422` responses.
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl HttpErrorOut {
    /// The detail rendered as a single line.
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_response_parsing() {
        let page: ListResponse<EventTypeOut> = serde_json::from_value(json!({
            "data": [{
                "name": "origin.visit",
                "description": "visit",
                "schemas": {"1": {"type": "object"}},
                "archived": false,
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            }],
            "iterator": "origin.visit",
            "prevIterator": null,
            "done": true
        }))
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.iterator.as_deref(), Some("origin.visit"));
        assert!(page.done);
        assert_eq!(page.data[0].schema(), Some(&json!({"type": "object"})));
    }

    #[test]
    fn test_error_detail_text() {
        let err: HttpErrorOut =
            serde_json::from_value(json!({"code": "not_found", "detail": "Entity not found"}))
                .unwrap();
        assert_eq!(err.detail_text(), "Entity not found");

        let err: HttpErrorOut = serde_json::from_value(json!({
            "code": "validation",
            "detail": [{"loc": ["body", "url"], "msg": "bad url"}]
        }))
        .unwrap();
        assert!(err.detail_text().contains("bad url"));
    }
}
