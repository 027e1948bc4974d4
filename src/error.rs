//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::billing::LedgerError;
use crate::classifier::ClassifyError;
use crate::models::STATUS_ERROR;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Detection errors
    #[error("No data")]
    EmptyPayload,

    #[error("{1}")]
    PayloadRejected(StatusCode, String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    InferenceError(String),

    // Billing errors
    #[error("Invalid billing request: {0}")]
    BillingRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::EmptyPayload => (StatusCode::BAD_REQUEST, json!({ "error": "No data" })),
            AppError::PayloadRejected(status, msg) => {
                tracing::warn!("Detect payload rejected: {}", msg);
                (*status, json!({ "detected_item": "None", "error": msg }))
            }
            AppError::InvalidImage(msg) => {
                tracing::warn!("Undecodable image: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "detected_item": "None", "error": self.to_string() }),
                )
            }
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detected_item": "None", "error": msg }),
                )
            }
            AppError::BillingRequest(msg) => {
                tracing::error!("Billing error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "status": STATUS_ERROR }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::EmptyPayload => AppError::EmptyPayload,
            ClassifyError::Decode(e) => AppError::InvalidImage(e.to_string()),
            ClassifyError::Inference(e) => AppError::InferenceError(e.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::BillingRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BillingRequest(rejection.body_text())
    }
}
