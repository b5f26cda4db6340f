//! Webhook event-type descriptor.
//!
//! An event type is a name of the form `<group>.<event>`, a human readable
//! description and a [JSON schema](https://json-schema.org/) describing the
//! payload sent when the event is triggered. Svix validates schemas against
//! draft 7, so this module does the same.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static EVENT_TYPE_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+\.[a-zA-Z0-9\-_]+$"));

/// Errors raised when an event-type descriptor itself is malformed.
#[derive(Debug, thiserror::Error)]
pub enum EventTypeError {
    #[error("Event type name must be in the form '<group>.<event>'")]
    InvalidName,
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),
}

/// A single schema violation found in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value (empty for the document root).
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// A payload did not match the JSON schema of its event type.
#[derive(Debug, thiserror::Error)]
pub enum PayloadValidationError {
    #[error("Payload validation against JSON schema failed: {}", join_issues(.0))]
    Invalid(Vec<ValidationIssue>),
    #[error(transparent)]
    Schema(#[from] EventTypeError),
}

impl PayloadValidationError {
    /// Schema violations, empty when the schema itself was broken.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Invalid(issues) => issues,
            Self::Schema(_) => &[],
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Webhook event-type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    /// Name of the event type, in the form `<group>.<event>`.
    pub name: String,
    /// Description of the event type.
    pub description: String,
    /// JSON schema describing the payload sent when the event is triggered.
    pub schema: Value,
}

impl EventType {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    /// `<group>` part of the name.
    pub fn group(&self) -> Option<&str> {
        self.name.split_once('.').map(|(group, _)| group)
    }

    /// Check that the name is in the form `<group>.<event>`.
    pub fn check_name(&self) -> Result<(), EventTypeError> {
        match EVENT_TYPE_NAME.as_ref() {
            Ok(re) if re.is_match(&self.name) => Ok(()),
            _ => Err(EventTypeError::InvalidName),
        }
    }

    /// Check that the schema is a valid draft 7 JSON schema.
    pub fn check_schema(&self) -> Result<(), EventTypeError> {
        self.validator().map(|_| ())
    }

    /// Check both the name and the schema, as done before registration.
    pub fn check(&self) -> Result<(), EventTypeError> {
        self.check_name()?;
        self.check_schema()
    }

    /// Validate a payload against the schema of this event type.
    ///
    /// Format keywords (`iri`, `date-time`, ...) are asserted, not only
    /// annotated. Every violation is collected.
    pub fn validate_payload(&self, payload: &Value) -> Result<(), PayloadValidationError> {
        let validator = self.validator()?;
        let issues: Vec<ValidationIssue> = validator
            .iter_errors(payload)
            .map(|error| ValidationIssue {
                instance_path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(PayloadValidationError::Invalid(issues))
        }
    }

    /// Shorthand for `validate_payload(..).is_ok()`.
    pub fn is_valid_payload(&self, payload: &Value) -> bool {
        self.validate_payload(payload).is_ok()
    }

    fn validator(&self) -> Result<jsonschema::Validator, EventTypeError> {
        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .should_validate_formats(true)
            .build(&self.schema)
            .map_err(|e| EventTypeError::InvalidSchema(e.to_string()))
    }
}
