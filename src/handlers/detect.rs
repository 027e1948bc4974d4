//! Detection handler

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};

use crate::classifier::ClassifierResult;
use crate::{AppError, AppResult, AppState};

/// Classify a raw image posted by the camera client
pub async fn detect(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ClassifierResult>> {
    let body = body.map_err(|r| AppError::PayloadRejected(r.status(), r.body_text()))?;
    if body.is_empty() {
        return Err(AppError::EmptyPayload);
    }

    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || classifier.classify(&body))
        .await
        .map_err(|e| AppError::InferenceError(format!("Inference task join error: {}", e)))??;

    Ok(Json(result))
}
