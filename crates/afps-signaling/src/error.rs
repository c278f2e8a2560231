/// Failures surfaced by [`crate::SignalingStore`]. Mirrors the taxonomy in
/// the original `signaling.h`'s `SignalingError` enum.
#[derive(Debug, thiserror::Error)]
pub enum SignalingError {
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("connection not found")]
    ConnectionNotFound,
    #[error("local description did not arrive before the deadline")]
    OfferTimeout,
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}

impl SignalingError {
    /// The stable error code string this maps to at the HTTP boundary.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound => "session_not_found",
            Self::SessionExpired => "session_expired",
            Self::ConnectionNotFound => "connection_not_found",
            Self::OfferTimeout => "offer_timeout",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// The HTTP status this error crosses the boundary as.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::SessionNotFound | Self::SessionExpired | Self::OfferTimeout => 401,
            Self::ConnectionNotFound | Self::InvalidRequest(_) => 400,
        }
    }
}
