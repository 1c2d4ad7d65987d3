use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::FoodMatch;
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /food-search?q=... ; queries shorter than two characters match nothing.
#[instrument(skip(state))]
pub async fn food_search(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<FoodMatch>>, (StatusCode, String)> {
    let q = params.q.trim();
    if q.chars().count() < 2 {
        return Ok(Json(Vec::new()));
    }
    let matches = state.nutrition.search(q).await.map_err(AppError::from)?;
    Ok(Json(matches))
}
