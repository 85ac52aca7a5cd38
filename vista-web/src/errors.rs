//! Proxy error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use vista_core::VistaError;

/// Errors returned by proxy routes.
///
/// Every variant renders as `{ "error": message, "kind": kind }` so clients
/// can tell missing credentials from provider or network failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProxyError {
    /// Provider credentials are missing or a placeholder.
    #[error("{reason}")]
    Configuration {
        /// Display message naming the variable to set
        reason: String,
    },

    /// Query parameters are missing or invalid.
    #[error("{reason}")]
    InvalidRequest {
        /// Display message
        reason: String,
    },

    /// Provider answered with an error.
    #[error("{reason}")]
    Upstream {
        /// Status code relayed to the client
        status: u16,
        /// Provider's error message
        reason: String,
    },

    /// Provider could not be reached or sent an unreadable body.
    #[error("{reason}")]
    Transport {
        /// Display message
        reason: String,
    },
}

impl ProxyError {
    /// Value of the `kind` field in the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Configuration { .. } => "configuration",
            ProxyError::InvalidRequest { .. } => "invalid_request",
            ProxyError::Upstream { .. } => "upstream",
            ProxyError::Transport { .. } => "transport",
        }
    }

    /// HTTP status for the response.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Transport { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub(crate) fn missing_parameters() -> Self {
        ProxyError::InvalidRequest {
            reason: "Missing required parameters".to_string(),
        }
    }
}

impl From<VistaError> for ProxyError {
    fn from(error: VistaError) -> Self {
        match error {
            VistaError::Configuration { reason } => ProxyError::Configuration { reason },
            other => ProxyError::Transport {
                reason: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("{} ({}): {}", status, self.kind(), self);
        }
        (status, Json(json!({ "error": self.to_string(), "kind": self.kind() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = ProxyError::Configuration {
            reason: "missing".to_string(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "configuration");

        let err = ProxyError::Upstream {
            status: 401,
            reason: "Invalid API key".to_string(),
        };
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        // Out of range codes fall back to a gateway error.
        let err = ProxyError::Upstream {
            status: 42,
            reason: "weird".to_string(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_configuration_error_converts() {
        let err: ProxyError = VistaError::Configuration {
            reason: "News API key is not configured".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "configuration");
    }
}
