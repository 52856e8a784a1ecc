//! Mapping from pipeline errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gfm_rs::capabilities::Constraints;
use gfm_rs::error::{GatewayError, GfmError};
use serde::Serialize;

/// A handler error. Picks the status code and the JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// Raised by the assistant pipeline.
    Pipeline(GfmError),
    /// A chat request carried nothing for the model to answer.
    EmptyChat,
}

impl<E: Into<GfmError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        ApiError::Pipeline(e.into())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    /// Present on validation failures so the UI can show the rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<Constraints>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyChat => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) => match e {
                GfmError::Validation(_) => StatusCode::BAD_REQUEST,
                GfmError::Gateway(GatewayError::Unconfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
                GfmError::Gateway(GatewayError::CallFailed(_)) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::EmptyChat => "empty_conversation",
            ApiError::Pipeline(GfmError::Validation(v)) => v.kind(),
            ApiError::Pipeline(GfmError::Gateway(GatewayError::Unconfigured(_))) => {
                "service_not_configured"
            }
            ApiError::Pipeline(GfmError::Gateway(GatewayError::CallFailed(_))) => {
                "inference_call_failed"
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::EmptyChat => {
                "chat request needs messages, a query, or a non-empty message".to_string()
            }
            ApiError::Pipeline(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let constraints =
            matches!(self, ApiError::Pipeline(GfmError::Validation(_))).then(Constraints::current);
        let body = ErrorBody {
            error: self.kind(),
            message: self.message(),
            constraints,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfm_rs::error::{CallFailure, ValidationError};

    #[test]
    fn status_codes_distinguish_error_classes() {
        let validation = ApiError::from(ValidationError::InvalidCoordinates { start: 2, end: 1 });
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let unconfigured = ApiError::from(GatewayError::Unconfigured("unset".into()));
        assert_eq!(unconfigured.status(), StatusCode::SERVICE_UNAVAILABLE);

        let failed = ApiError::from(GatewayError::from(CallFailure::EmptyReply));
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(failed.kind(), "inference_call_failed");
    }

    #[test]
    fn validation_kind_passes_through() {
        let err = ApiError::from(ValidationError::RegionTooLarge {
            size_bp: 700_000,
            max_kb: 600,
        });
        assert_eq!(err.kind(), "region_too_large");
    }

    #[test]
    fn empty_chat_is_bad_request() {
        let err = ApiError::EmptyChat;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "empty_conversation");
        assert!(err.message().contains("non-empty message"));
    }
}
