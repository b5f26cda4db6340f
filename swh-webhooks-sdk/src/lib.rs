//! Shared types for Software Heritage webhooks.
//!
//! The webhooks themselves are delivered by an external [Svix](https://docs.svix.com/)
//! server. This crate holds what both the management side and the receiving
//! side need to agree on: the event-type descriptors with their JSON schemas,
//! the Svix wire objects, webhook signature verification, and (behind the
//! `client` feature) a typed HTTP client for the Svix REST API.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod event_type;
pub mod events;
pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;

pub use event_type::{EventType, EventTypeError, PayloadValidationError, ValidationIssue};
pub use events::default_event_types;
