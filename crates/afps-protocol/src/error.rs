/// Failures surfaced while decoding or validating a wire message. The
/// binary crate's top-level error composes this via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message of {size} bytes exceeds the {limit}-byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl ProtocolError {
    /// The stable error code string sent back on the wire inside an
    /// `Error` message or an HTTP `{error, message}` body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::MalformedJson(_) => "invalid_request",
            Self::InvalidField { .. } => "invalid_request",
        }
    }
}
