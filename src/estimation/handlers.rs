use axum::{extract::State, http::StatusCode, Json};
use tracing::instrument;

use super::{
    category::{detect, Detection},
    dto::{DetectCategoryRequest, Estimate, EstimateRequest},
    orchestrator::estimate,
};
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

/// POST /estimate: live preview, nothing is stored.
#[instrument(skip(state, body))]
pub async fn estimate_preview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EstimateRequest>,
) -> Result<Json<Estimate>, (StatusCode, String)> {
    let input = body.into_input()?;
    let est = estimate(&state, user_id, &input).await?;
    Ok(Json(est))
}

#[instrument(skip(body))]
pub async fn detect_category(
    AuthUser(_user_id): AuthUser,
    Json(body): Json<DetectCategoryRequest>,
) -> Result<Json<Detection>, (StatusCode, String)> {
    let name = body
        .name
        .ok_or_else(|| AppError::invalid("name", "is required"))?;
    Ok(Json(detect(&name)))
}
