//! Error taxonomy for the gateway.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl
//! renders the JSON envelope the frontend already understands:
//! `{timestamp, status, error, message, detail?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range caller input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// The inference service could not be reached.
    #[error("no connection to the inference service: {0}")]
    UpstreamUnavailable(String),

    /// The inference service did not answer within the read timeout.
    #[error("inference service timed out: {0}")]
    UpstreamTimeout(String),

    /// The inference service answered with a non-success status.
    #[error("inference service returned {status}")]
    Upstream { status: StatusCode, body: String },

    /// The response body lacked the expected result collection.
    #[error("malformed inference response: {0}")]
    MalformedUpstreamResponse(String),

    /// A result record was missing a mandatory field (label or text).
    #[error("invalid inference result: {0}")]
    InvalidResult(String),

    /// Anything else. Logged in full, surfaced as a generic message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable(_) | ApiError::UpstreamTimeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Upstream { status, .. } => *status,
            ApiError::MalformedUpstreamResponse(_)
            | ApiError::InvalidResult(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation Error",
            ApiError::UpstreamUnavailable(_) | ApiError::UpstreamTimeout(_) => {
                "Service Unavailable"
            }
            ApiError::Upstream { .. } => "Upstream Error",
            ApiError::MalformedUpstreamResponse(_) | ApiError::InvalidResult(_) => {
                "Invalid Upstream Response"
            }
            ApiError::Internal(_) => "Internal Server Error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::UpstreamUnavailable(_) | ApiError::UpstreamTimeout(_) => {
                "No se puede conectar con el servicio de análisis de sentimientos. \
                 Verifica que el servicio de inferencia esté corriendo."
                    .to_string()
            }
            ApiError::Upstream { .. } => {
                "Error al procesar la solicitud en el servicio de análisis".to_string()
            }
            ApiError::MalformedUpstreamResponse(_) | ApiError::InvalidResult(_) => {
                "La respuesta del servicio de análisis no tiene el formato esperado".to_string()
            }
            ApiError::Internal(_) => "Ha ocurrido un error inesperado".to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ApiError::Validation(_) => None,
            ApiError::UpstreamUnavailable(d) | ApiError::UpstreamTimeout(d) => Some(d.clone()),
            ApiError::Upstream { body, .. } => Some(body.clone()),
            ApiError::MalformedUpstreamResponse(d) | ApiError::InvalidResult(d) => Some(d.clone()),
            ApiError::Internal(e) => Some(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let mut body = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "status": status.as_u16(),
            "error": self.label(),
            "message": self.message(),
        });
        if let Some(detail) = self.detail() {
            body["detail"] = json!(detail);
        }
        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        // A connect-phase timeout still counts as "cannot reach the service".
        if error.is_connect() {
            ApiError::UpstreamUnavailable(error.to_string())
        } else if error.is_timeout() {
            ApiError::UpstreamTimeout(error.to_string())
        } else {
            ApiError::Internal(anyhow::Error::new(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let e = ApiError::Validation("bad input".into());
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(e.message(), "bad input");
        assert!(e.detail().is_none());
    }

    #[test]
    fn network_failures_map_to_503() {
        let e = ApiError::UpstreamUnavailable("connection refused".into());
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let e = ApiError::UpstreamTimeout("deadline elapsed".into());
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_status_is_relayed() {
        let e = ApiError::Upstream {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: "{\"detail\":\"bad idioma\"}".into(),
        };
        assert_eq!(e.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.detail().as_deref(), Some("{\"detail\":\"bad idioma\"}"));
    }

    #[test]
    fn contract_violations_are_internal() {
        let e = ApiError::InvalidResult("missing 'prevision'".into());
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let e = ApiError::MalformedUpstreamResponse("no 'resultados'".into());
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
