//! Webhook signature verification helpers for receivers.
//!
//! Convenience wrappers around [`WebhookSecret`] for verifying incoming
//! webhook payloads delivered by the Svix server.

use serde::de::DeserializeOwned;

use crate::signature::{SignatureError, WebhookHeaders, WebhookSecret};

/// Verify and deserialize an incoming webhook.
///
/// * `body` – raw request body string.
/// * `headers` – request headers as `(name, value)` pairs.
/// * `secret` – the endpoint secret (`whsec_...`).
///
/// Returns the deserialized, authenticated payload on success.
///
/// # Example
///
/// ```ignore
/// use swh_webhooks_sdk::client::verify_webhook;
/// use swh_webhooks_sdk::events::origin_visit::OriginVisitPayload;
///
/// let payload: OriginVisitPayload = verify_webhook(&body, headers, &secret)?;
/// ```
pub fn verify_webhook<'a, T, I>(body: &str, headers: I, secret: &str) -> Result<T, SignatureError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let headers = WebhookHeaders::from_pairs(headers)?;
    WebhookSecret::new(secret)?.verify(body, &headers)?;
    Ok(serde_json::from_str(body)?)
}

/// [`verify_webhook`] returning the raw JSON payload.
pub fn verify_webhook_json<'a, I>(
    body: &str,
    headers: I,
    secret: &str,
) -> Result<serde_json::Value, SignatureError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    verify_webhook(body, headers, secret)
}
