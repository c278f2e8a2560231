//! The top-level error type the HTTP front door converts into a response.
//! Composes every crate-specific error via `#[from]` and maps it to an
//! HTTP status/body shape, mirroring how each lower crate already carries
//! its own `code()`/`http_status()` pair. Configuration errors are not
//! part of this type: they are fatal at startup, logged and exited on
//! directly in `main`, never surfaced through a request.

use afps_protocol::{http::ErrorResponse, ProtocolError};
use afps_signaling::{InputRejection, SignalingError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug, thiserror::Error)]
pub enum AfpsError {
    #[error(transparent)]
    Signaling(#[from] SignalingError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("rejected: {0:?}")]
    Input(InputRejection),
}

impl AfpsError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Signaling(err) => err.code(),
            Self::Protocol(err) => err.code(),
            Self::Input(rejection) => match rejection {
                InputRejection::InvalidJson => "invalid_json",
                InputRejection::ProtocolMismatch => "protocol_mismatch",
                InputRejection::IdMismatch => "id_mismatch",
                InputRejection::StaleSequence => "stale_sequence",
                InputRejection::OversizedMessage => "oversized_message",
                InputRejection::BeforeHandshake => "before_handshake",
                InputRejection::RateLimited => "rate_limited",
            },
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Signaling(err) => match err.http_status() {
                401 => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Protocol(ProtocolError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Protocol(_) => StatusCode::BAD_REQUEST,
            Self::Input(InputRejection::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            Self::Input(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AfpsError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code().to_owned(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
