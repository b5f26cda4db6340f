//! `origin.visit`: a visit of a software origin was performed.
//!
//! The payload carries five mandatory keys. `snapshot_swhid` is always
//! present, and is `null` when the visit produced no snapshot.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::event_type::{EventType, PayloadValidationError};

pub const NAME: &str = "origin.visit";

pub const DESCRIPTION: &str =
    "This event is triggered when a new visit of a software origin was performed";

/// Pattern of a snapshot SWHID.
pub const SNAPSHOT_SWHID_PATTERN: &str = "^swh:1:snp:[0-9a-f]{40}$";

static SNAPSHOT_SWHID: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(SNAPSHOT_SWHID_PATTERN));

/// JSON schema of the `origin.visit` payload.
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "origin_url": {
                "type": "string",
                "description": "The URL of the visited software origin",
                "format": "iri"
            },
            "visit_type": {
                "type": "string",
                "description": "The type of visit performed"
            },
            "visit_date": {
                "type": "string",
                "format": "date-time",
                "description": "The date the visit was performed"
            },
            "visit_status": {
                "type": "string",
                "enum": VisitStatus::ALL.iter().map(VisitStatus::as_str).collect::<Vec<_>>(),
                "description": "The status of the visit"
            },
            "snapshot_swhid": {
                "type": ["string", "null"],
                "pattern": SNAPSHOT_SWHID_PATTERN,
                "description": "The SWHID of the snapshot taken during the visit, if any"
            }
        },
        "required": [
            "origin_url",
            "visit_type",
            "visit_date",
            "visit_status",
            "snapshot_swhid"
        ]
    })
}

/// The `origin.visit` event-type descriptor.
pub fn event_type() -> EventType {
    EventType::new(NAME, DESCRIPTION, schema())
}

/// Status of an origin visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Created,
    Ongoing,
    Full,
    Partial,
    NotFound,
    Failed,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 6] = [
        VisitStatus::Created,
        VisitStatus::Ongoing,
        VisitStatus::Full,
        VisitStatus::Partial,
        VisitStatus::NotFound,
        VisitStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Created => "created",
            VisitStatus::Ongoing => "ongoing",
            VisitStatus::Full => "full",
            VisitStatus::Partial => "partial",
            VisitStatus::NotFound => "not_found",
            VisitStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid snapshot SWHID: {0:?}")]
pub struct InvalidSwhid(pub String);

/// Snapshot SWHID, `swh:1:snp:` followed by 40 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotSwhid(String);

impl SnapshotSwhid {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits of the snapshot identifier.
    pub fn object_id(&self) -> &str {
        &self.0["swh:1:snp:".len()..]
    }
}

impl FromStr for SnapshotSwhid {
    type Err = InvalidSwhid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match SNAPSHOT_SWHID.as_ref() {
            Ok(re) if re.is_match(s) => Ok(Self(s.to_owned())),
            _ => Err(InvalidSwhid(s.to_owned())),
        }
    }
}

impl TryFrom<String> for SnapshotSwhid {
    type Error = InvalidSwhid;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SnapshotSwhid> for String {
    fn from(value: SnapshotSwhid) -> Self {
        value.0
    }
}

impl fmt::Display for SnapshotSwhid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed `origin.visit` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginVisitPayload {
    pub origin_url: String,
    pub visit_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub visit_date: OffsetDateTime,
    pub visit_status: VisitStatus,
    /// Serialized as `null` rather than omitted.
    pub snapshot_swhid: Option<SnapshotSwhid>,
}

impl OriginVisitPayload {
    /// Serialize the payload and check it against the published schema.
    pub fn to_validated_json(&self) -> Result<Value, PayloadValidationError> {
        let value = serde_json::to_value(self).map_err(|e| {
            PayloadValidationError::Invalid(vec![crate::event_type::ValidationIssue {
                instance_path: String::new(),
                message: e.to_string(),
            }])
        })?;
        event_type().validate_payload(&value)?;
        Ok(value)
    }
}
