//! Unverified JWT decoding
//!
//! Splits a compact token into its segments and decodes the header or the
//! payload. The signature is never checked.

use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Padded base64url that accepts nonzero trailing bits in the last symbol
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decoded payload of a token, keyed by claim name
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    claims: Map<String, Value>,
}

impl Payload {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// All claims present in the token, including unrecognized ones
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    pub fn issuer(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    pub fn partner_id(&self) -> Option<&str> {
        self.str_claim("partnerId")
    }

    /// Expiry (exp) in epoch seconds, only if it is an integer
    pub fn expires_at(&self) -> Option<i64> {
        self.get("exp").and_then(|v| v.as_i64())
    }

    /// Issued-at (iat) in epoch seconds, only if it is an integer
    pub fn issued_at(&self) -> Option<i64> {
        self.get("iat").and_then(|v| v.as_i64())
    }

    pub fn token_consumer_type(&self) -> Option<&str> {
        self.str_claim("tokenConsumerType")
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.str_claim("webhookUrl")
    }

    pub fn client_id(&self) -> Option<&str> {
        self.str_claim("dhanClientId")
    }
}

/// Decode the payload (second segment) of a token without verification
pub fn decode(token: &str) -> Result<Payload, DecodeError> {
    let segment = token
        .trim()
        .split('.')
        .nth(1)
        .ok_or(DecodeError::MissingPayload)?;
    decode_segment(segment, "payload").map(Payload::new)
}

/// Decode the header (first segment) of a token without verification
pub fn decode_header(token: &str) -> Result<Map<String, Value>, DecodeError> {
    let token = token.trim();
    if !token.contains('.') {
        return Err(DecodeError::MissingPayload);
    }
    let segment = token.split('.').next().unwrap_or_default();
    decode_segment(segment, "header")
}

fn decode_segment(
    segment: &str,
    name: &'static str,
) -> Result<Map<String, Value>, DecodeError> {
    // Tokens are emitted unpadded; restore padding so the padded engine accepts it
    let mut padded = segment.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE_LENIENT
        .decode(&padded)
        .map_err(|e| DecodeError::InvalidBase64 {
            segment: name,
            reason: e.to_string(),
        })?;

    let value: Value = serde_json::from_slice(&bytes).map_err(|e| DecodeError::InvalidJson {
        segment: name,
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(claims) => Ok(claims),
        _ => Err(DecodeError::NotAnObject { segment: name }),
    }
}
