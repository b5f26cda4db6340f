//! Software Heritage webhooks management built on top of the Svix framework.
//!
//! [`Webhooks`] wraps the Svix REST API with the conventions this project
//! relies on: one Svix application per event type, deterministic endpoint
//! identifiers, channel names mapped to UUIDs, and payloads validated against
//! the event-type schema before they are sent.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod deployment;
pub mod entities;
pub mod webhooks;

pub use entities::{Endpoint, SentEvent};
pub use webhooks::{Webhooks, WebhooksError};
