//! Webhook signatures as produced by the Svix server.
//!
//! Every delivered webhook carries three headers:
//!
//! ```text
//! webhook-id: {msg_id}
//! webhook-timestamp: {unix_timestamp}
//! webhook-signature: v1,{base64_signature} [v1,{base64_signature} ...]
//! ```
//!
//! where the signature is `HMAC-SHA256("{msg_id}.{timestamp}.{body}", key)`
//! and `key` is the base64 part of the endpoint secret `whsec_{base64}`.
//! Older Svix versions send the same headers with a `svix-` prefix.

/// Header carrying the message identifier.
pub const WEBHOOK_ID_HEADER: &str = "webhook-id";

/// Header carrying the unix timestamp of the delivery attempt.
pub const WEBHOOK_TIMESTAMP_HEADER: &str = "webhook-timestamp";

/// Header carrying the space separated list of signatures.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "webhook-signature";

const LEGACY_ID_HEADER: &str = "svix-id";
const LEGACY_TIMESTAMP_HEADER: &str = "svix-timestamp";
const LEGACY_SIGNATURE_HEADER: &str = "svix-signature";

/// Prefix of endpoint secrets handed out by Svix.
pub const SECRET_PREFIX: &str = "whsec_";

/// Version tag of the only supported signature scheme.
pub const SIGNATURE_VERSION: &str = "v1";

/// Maximum allowed distance between a signature timestamp and now (in seconds).
pub const TIMESTAMP_TOLERANCE: i64 = 5 * 60;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),
    #[error("invalid header format")]
    InvalidFormat,
    #[error("invalid secret")]
    InvalidSecret,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Webhook payload verification failed")]
    SignatureMismatch,
    #[error("signature timestamp too old")]
    Expired,
    #[error("signature timestamp too new")]
    FromTheFuture,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

// ---------------------------------------------------------------------------
// WebhookSecret
// ---------------------------------------------------------------------------

/// An endpoint signing secret.
#[derive(Clone)]
pub struct WebhookSecret {
    key: ring::hmac::Key,
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}

impl WebhookSecret {
    /// Parse a `whsec_{base64}` secret. The prefix is optional.
    pub fn new(secret: &str) -> Result<Self, SignatureError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let raw = fast32::base64::RFC4648
            .decode_str(encoded)
            .map_err(|_| SignatureError::InvalidSecret)?;
        Ok(Self::from_bytes(&raw))
    }

    /// Build a secret from raw key bytes.
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            key: ring::hmac::Key::new(ring::hmac::HMAC_SHA256, raw),
        }
    }

    /// Compute the `webhook-signature` header value (`v1,{base64}`).
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &str) -> String {
        let data = signed_content(msg_id, timestamp, payload);
        let tag = ring::hmac::sign(&self.key, data.as_bytes());
        format!(
            "{SIGNATURE_VERSION},{}",
            fast32::base64::RFC4648.encode(tag.as_ref())
        )
    }

    /// Verify a delivered payload against its headers.
    ///
    /// Succeeds if any `v1` signature in the header matches and the
    /// timestamp is within [`TIMESTAMP_TOLERANCE`] of now.
    pub fn verify(&self, payload: &str, headers: &WebhookHeaders) -> Result<(), SignatureError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidFormat)?;
        check_timestamp(timestamp)?;

        let data = signed_content(&headers.msg_id, timestamp, payload);
        let matched = parse_signature_header(&headers.signature)
            .iter()
            .any(|sig| ring::hmac::verify(&self.key, data.as_bytes(), sig).is_ok());
        if matched {
            Ok(())
        } else {
            Err(SignatureError::SignatureMismatch)
        }
    }
}

fn signed_content(msg_id: &str, timestamp: i64, payload: &str) -> String {
    format!("{msg_id}.{timestamp}.{payload}")
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

/// The signature related headers of a delivered webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub msg_id: String,
    pub timestamp: String,
    pub signature: String,
}

impl WebhookHeaders {
    /// Extract the headers from `(name, value)` pairs, names being compared
    /// case-insensitively. `webhook-*` names win over `svix-*` ones.
    pub fn from_pairs<'a, I>(headers: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut found: [Option<&str>; 3] = [None; 3];
        let mut legacy: [Option<&str>; 3] = [None; 3];
        for (name, value) in headers {
            let name = name.to_ascii_lowercase();
            match name.as_str() {
                WEBHOOK_ID_HEADER => found[0] = Some(value),
                WEBHOOK_TIMESTAMP_HEADER => found[1] = Some(value),
                WEBHOOK_SIGNATURE_HEADER => found[2] = Some(value),
                LEGACY_ID_HEADER => legacy[0] = Some(value),
                LEGACY_TIMESTAMP_HEADER => legacy[1] = Some(value),
                LEGACY_SIGNATURE_HEADER => legacy[2] = Some(value),
                _ => {}
            }
        }
        let pick = |i: usize, header: &'static str| {
            found[i]
                .or(legacy[i])
                .map(str::to_owned)
                .ok_or(SignatureError::MissingHeader(header))
        };
        Ok(Self {
            msg_id: pick(0, WEBHOOK_ID_HEADER)?,
            timestamp: pick(1, WEBHOOK_TIMESTAMP_HEADER)?,
            signature: pick(2, WEBHOOK_SIGNATURE_HEADER)?,
        })
    }
}

/// Decode every `v1,{base64}` entry of a `webhook-signature` header.
///
/// Entries with another version or undecodable base64 are skipped.
pub fn parse_signature_header(value: &str) -> Vec<Vec<u8>> {
    value
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .filter(|(version, _)| *version == SIGNATURE_VERSION)
        .filter_map(|(_, sig)| fast32::base64::RFC4648.decode_str(sig).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Timestamp validation
// ---------------------------------------------------------------------------

/// Check that a signature timestamp is within [`TIMESTAMP_TOLERANCE`] of now.
pub fn check_timestamp(timestamp: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    // the header is untrusted, any i64 may show up here
    if now.abs_diff(timestamp) <= TIMESTAMP_TOLERANCE.unsigned_abs() {
        Ok(())
    } else if timestamp < now {
        Err(SignatureError::Expired)
    } else {
        Err(SignatureError::FromTheFuture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    fn headers(msg_id: &str, timestamp: i64, signature: String) -> WebhookHeaders {
        WebhookHeaders {
            msg_id: msg_id.to_owned(),
            timestamp: timestamp.to_string(),
            signature,
        }
    }

    fn now() -> i64 {
        time::OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn test_sign_then_verify() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let ts = now();
        let payload = r#"{"origin_url":"https://example.org/repo.git"}"#;
        let sig = secret.sign("msg_1", ts, payload);
        assert!(sig.starts_with("v1,"));
        secret.verify(payload, &headers("msg_1", ts, sig)).unwrap();
    }

    #[test]
    fn test_prefix_is_optional() {
        let with = WebhookSecret::new(SECRET).unwrap();
        let without = WebhookSecret::new(&SECRET[SECRET_PREFIX.len()..]).unwrap();
        assert_eq!(with.sign("m", 1, "{}"), without.sign("m", 1, "{}"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let other = WebhookSecret::from_bytes(b"another secret");
        let ts = now();
        let sig = other.sign("msg_1", ts, "{}");
        assert!(matches!(
            secret.verify("{}", &headers("msg_1", ts, sig)),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let ts = now();
        let sig = secret.sign("msg_1", ts, r#"{"a":1}"#);
        assert!(secret.verify(r#"{"a":2}"#, &headers("msg_1", ts, sig)).is_err());
    }

    #[test]
    fn test_multiple_signatures() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let other = WebhookSecret::from_bytes(b"rotated");
        let ts = now();
        let header = format!(
            "{} v2,abc {}",
            other.sign("msg_1", ts, "{}"),
            secret.sign("msg_1", ts, "{}")
        );
        secret.verify("{}", &headers("msg_1", ts, header)).unwrap();
    }

    #[test]
    fn test_expired_timestamp() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let ts = now() - TIMESTAMP_TOLERANCE - 10;
        let sig = secret.sign("msg_1", ts, "{}");
        assert!(matches!(
            secret.verify("{}", &headers("msg_1", ts, sig)),
            Err(SignatureError::Expired)
        ));
    }

    #[test]
    fn test_future_timestamp() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let ts = now() + TIMESTAMP_TOLERANCE + 10;
        let sig = secret.sign("msg_1", ts, "{}");
        assert!(matches!(
            secret.verify("{}", &headers("msg_1", ts, sig)),
            Err(SignatureError::FromTheFuture)
        ));
    }

    #[test]
    fn test_invalid_secret() {
        assert!(matches!(
            WebhookSecret::new("whsec_***"),
            Err(SignatureError::InvalidSecret)
        ));
    }

    #[test]
    fn test_headers_from_pairs() {
        let parsed = WebhookHeaders::from_pairs([
            ("Webhook-Id", "msg_1"),
            ("svix-timestamp", "42"),
            ("webhook-timestamp", "43"),
            ("Webhook-Signature", "v1,abc"),
        ])
        .unwrap();
        assert_eq!(parsed.msg_id, "msg_1");
        assert_eq!(parsed.timestamp, "43");

        assert!(matches!(
            WebhookHeaders::from_pairs([("webhook-id", "msg_1")]),
            Err(SignatureError::MissingHeader(WEBHOOK_TIMESTAMP_HEADER))
        ));
    }

    #[test]
    fn test_extreme_timestamps_are_rejected() {
        let secret = WebhookSecret::new(SECRET).unwrap();
        let sig = secret.sign("msg_1", i64::MIN, "{}");
        assert!(matches!(
            secret.verify("{}", &headers("msg_1", i64::MIN, sig)),
            Err(SignatureError::Expired)
        ));
        let sig = secret.sign("msg_1", i64::MAX, "{}");
        assert!(matches!(
            secret.verify("{}", &headers("msg_1", i64::MAX, sig)),
            Err(SignatureError::FromTheFuture)
        ));
    }
}
