//! Request bodies and the error envelope for the HTTP API.

use crate::engine::EngineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of events returned by `GET /v1/events`.
pub const DEFAULT_EVENT_LIMIT: usize = 50;

/// Body of `POST /v1/campaigns/:id/spend`.
///
/// The amount may be a JSON string (`"12.50"`) or number.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpendRequest {
    pub amount: Decimal,
}

/// Query string of `GET /v1/events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

impl EventsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_EVENT_LIMIT)
    }
}

/// API error response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn new(message: String, r#type: &str, param: Option<&str>, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message,
                r#type: r#type.to_string(),
                param: param.map(str::to_string),
                code: Some(code.to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::new(
            message.to_string(),
            "invalid_request_error",
            None,
            "invalid_request_error",
        )
    }

    /// Create a not found error (404).
    pub fn not_found(message: String, param: &str) -> Self {
        Self::new(message, "invalid_request_error", Some(param), "not_found")
    }

    /// Create a conflict error (409).
    pub fn conflict(message: String) -> Self {
        Self::new(message, "invalid_request_error", None, "conflict")
    }

    /// Create an unprocessable entity error (422).
    pub fn unprocessable(message: String) -> Self {
        Self::new(message, "invalid_request_error", None, "validation_error")
    }

    /// Create a service unavailable error (503).
    pub fn service_unavailable(message: &str) -> Self {
        Self::new(
            message.to_string(),
            "server_error",
            None,
            "service_unavailable",
        )
    }

    /// Create an internal server error (500).
    pub fn internal(message: &str) -> Self {
        Self::new(message.to_string(), "server_error", None, "internal_error")
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("not_found") => StatusCode::NOT_FOUND,
            Some("conflict") => StatusCode::CONFLICT,
            Some("validation_error") => StatusCode::UNPROCESSABLE_ENTITY,
            Some("service_unavailable") => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::InvalidAmount(_) => {
                Self::new(message, "invalid_request_error", Some("amount"), "invalid_request_error")
            }
            EngineError::UnknownCampaign(_) => Self::not_found(message, "campaign_id"),
            EngineError::UnknownBrand(_) => Self::not_found(message, "brand_id"),
            EngineError::InvalidTransition(_)
            | EngineError::DuplicateCampaign(_)
            | EngineError::DuplicateBrand(_) => Self::conflict(message),
            EngineError::InvalidCampaign(_) | EngineError::InvalidSchedule(_) => {
                Self::unprocessable(message)
            }
            EngineError::StoreUnavailable(_) => Self::service_unavailable(&message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
