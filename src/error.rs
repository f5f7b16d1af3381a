use thiserror::Error;

/// Failure to turn a compact token into claims.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid JWT format: expected at least two segments separated by '.'")]
    MissingPayload,

    #[error("Base64URL decoding of the {segment} failed: {reason}")]
    InvalidBase64 {
        segment: &'static str,
        reason: String,
    },

    #[error("JSON parsing of the {segment} failed: {reason}")]
    InvalidJson {
        segment: &'static str,
        reason: String,
    },

    #[error("The {segment} is valid JSON but not an object")]
    NotAnObject { segment: &'static str },
}
