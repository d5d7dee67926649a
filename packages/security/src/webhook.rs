// ABOUTME: Verification and parsing of identity-provider webhooks
// ABOUTME: Svix-style HMAC-SHA256 signatures over "{id}.{timestamp}.{body}"

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::users::IdentityProfile;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Maximum clock skew accepted between the provider and this server
pub const DEFAULT_TOLERANCE_SECS: u64 = 5 * 60;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Invalid webhook secret: {0}")]
    InvalidSecret(String),

    #[error("Missing webhook header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid webhook timestamp")]
    InvalidTimestamp,

    #[error("Webhook timestamp outside tolerance")]
    TimestampOutOfRange,

    #[error("No matching webhook signature")]
    SignatureMismatch,

    #[error("Malformed webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The three signing headers sent with each delivery
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

pub struct WebhookVerifier {
    key: Vec<u8>,
    tolerance_secs: u64,
}

impl WebhookVerifier {
    /// Build a verifier from a `whsec_<base64>` signing secret
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = STANDARD
            .decode(encoded.trim())
            .map_err(|e| WebhookError::InvalidSecret(e.to_string()))?;
        if key.is_empty() {
            return Err(WebhookError::InvalidSecret("secret is empty".to_string()));
        }

        Ok(Self {
            key,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        })
    }

    /// Verify a delivery against the current clock
    pub fn verify(&self, headers: &WebhookHeaders, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Verify a delivery against an explicit unix time
    pub fn verify_at(
        &self,
        headers: &WebhookHeaders,
        body: &[u8],
        now_secs: i64,
    ) -> Result<(), WebhookError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;

        if now_secs.abs_diff(timestamp) > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfRange);
        }

        let expected = self.sign(&headers.id, timestamp, body);

        // Header carries space-separated "v1,<base64>" entries; any match is accepted
        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .any(|(_, sig)| bool::from(sig.as_bytes().ct_eq(expected.as_bytes())));

        if matched {
            Ok(())
        } else {
            Err(WebhookError::SignatureMismatch)
        }
    }

    /// Base64 HMAC-SHA256 of "{id}.{timestamp}.{body}"
    pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    id: String,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeletedData {
    id: String,
}

/// User lifecycle event delivered by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    UserUpserted(IdentityProfile),
    UserDeleted { external_id: String },
    Ignored { event_type: String },
}

impl IdentityEvent {
    /// Parse a verified payload body
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let envelope: Envelope = serde_json::from_slice(body)?;

        match envelope.event_type.as_str() {
            "user.created" | "user.updated" => {
                let data: UserData = serde_json::from_value(envelope.data)?;
                Ok(IdentityEvent::UserUpserted(data.into_profile()))
            }
            "user.deleted" => {
                let data: DeletedData = serde_json::from_value(envelope.data)?;
                Ok(IdentityEvent::UserDeleted {
                    external_id: data.id,
                })
            }
            _ => Ok(IdentityEvent::Ignored {
                event_type: envelope.event_type,
            }),
        }
    }
}

impl UserData {
    fn into_profile(self) -> IdentityProfile {
        let email = self
            .primary_email_address_id
            .as_deref()
            .and_then(|primary| self.email_addresses.iter().find(|e| e.id == primary))
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.clone())
            .unwrap_or_default();

        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let name = if !full_name.is_empty() {
            full_name
        } else {
            self.username.unwrap_or_else(|| email.clone())
        };

        IdentityProfile {
            external_id: self.id,
            email,
            name,
        }
    }
}
