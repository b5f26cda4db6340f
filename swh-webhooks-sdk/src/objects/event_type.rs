//! Event-type objects of the Svix API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SCHEMA_VERSION_KEY;
use crate::event_type::EventType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeIn {
    pub name: String,
    pub description: String,
    pub schemas: BTreeMap<String, Value>,
}

impl From<&EventType> for EventTypeIn {
    fn from(event_type: &EventType) -> Self {
        Self {
            name: event_type.name.clone(),
            description: event_type.description.clone(),
            schemas: BTreeMap::from([(SCHEMA_VERSION_KEY.to_owned(), event_type.schema.clone())]),
        }
    }
}

/// Update body. Updating an archived event type unarchives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeUpdate {
    pub description: String,
    pub schemas: BTreeMap<String, Value>,
    pub archived: bool,
}

impl From<&EventType> for EventTypeUpdate {
    fn from(event_type: &EventType) -> Self {
        Self {
            description: event_type.description.clone(),
            schemas: BTreeMap::from([(SCHEMA_VERSION_KEY.to_owned(), event_type.schema.clone())]),
            archived: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeOut {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schemas: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub archived: bool,
}

impl EventTypeOut {
    /// Schema of version 1, the only version this project publishes.
    pub fn schema(&self) -> Option<&Value> {
        self.schemas.as_ref()?.get(SCHEMA_VERSION_KEY)
    }

    /// Convert into a descriptor, an absent schema becoming `{}`.
    pub fn into_event_type(self) -> EventType {
        let schema = self
            .schemas
            .and_then(|mut schemas| schemas.remove(SCHEMA_VERSION_KEY))
            .unwrap_or_else(|| Value::Object(Default::default()));
        EventType::new(self.name, self.description, schema)
    }
}

/// Query of `GET /api/v1/event-type/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub with_content: bool,
    pub include_archived: bool,
}
