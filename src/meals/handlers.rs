use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        parse_date, CorrectionRequest, CorrectionResponse, DailyLogQuery, DailySummary, Deleted,
        LogMealRequest, LoggedMeal, MealListQuery,
    },
    repo_types::MealLogEntry,
    services,
};
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

const MAX_PAGE: i64 = 100;

/// POST /meals
#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<LoggedMeal>), (StatusCode, String)> {
    let logged = services::log_meal(&state, user_id, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meals/{}", logged.meal.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(logged)))
}

/// GET /meals?date=YYYY-MM-DD&limit=&offset=
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<MealListQuery>,
) -> Result<Json<Vec<MealLogEntry>>, (StatusCode, String)> {
    let day = parse_date(q.date.as_deref())?;
    let limit = q.limit.clamp(1, MAX_PAGE);
    let offset = q.offset.max(0);
    let meals = state
        .meals
        .list_by_user(user_id, day, limit, offset)
        .await
        .map_err(AppError::from)?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealLogEntry>, (StatusCode, String)> {
    let meal = state
        .meals
        .get(user_id, id)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::NotFound)?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, (StatusCode, String)> {
    let deleted = state.meals.delete(user_id, id).await.map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::NotFound.into());
    }
    Ok(Json(Deleted { id, deleted }))
}

/// POST /meals/:id/correction { "percent_change": -10 }
#[instrument(skip(state, body))]
pub async fn apply_correction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CorrectionRequest>,
) -> Result<Json<CorrectionResponse>, (StatusCode, String)> {
    let res = services::apply_correction(&state, user_id, id, &body.percent_change).await?;
    Ok(Json(res))
}

/// GET /daily-log?date=YYYY-MM-DD; defaults to today (UTC).
#[instrument(skip(state))]
pub async fn daily_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DailyLogQuery>,
) -> Result<Json<DailySummary>, (StatusCode, String)> {
    let date = parse_date(q.date.as_deref())?.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let summary = services::daily_summary(&state, user_id, date).await?;
    Ok(Json(summary))
}
