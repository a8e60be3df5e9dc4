use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error envelope returned for every failed request.
///
/// `success` is only emitted on the configuration and transport paths, matching what the
/// inventory UI already parses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid action")]
    InvalidAction,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Airtable credentials not configured. Missing: {}", .missing.join(", "))]
    NotConfigured { missing: Vec<&'static str> },

    #[error("Failed to reach Airtable: {0}")]
    Transport(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },
}

impl ServiceError {
    /// Builds a transport error from a reqwest failure with the request URL removed,
    /// since the URL embeds the base id.
    pub fn transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            ServiceError::Transport(format!("request timed out ({})", err))
        } else {
            ServiceError::Transport(err.to_string())
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAction => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotConfigured { .. } | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn envelope(&self) -> ErrorResponse {
        let success = match self {
            Self::NotConfigured { .. } | Self::Transport(_) => Some(false),
            Self::InvalidAction | Self::PayloadTooLarge | Self::Upstream { .. } => None,
        };
        ErrorResponse {
            success,
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(self.envelope())).into_response()
    }
}
