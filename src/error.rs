use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

use crate::nutrition::LookupError;

/// Failures surfaced to the caller of an estimate, log, or correction.
///
/// Baseline learning failures never appear here; they are reported through
/// [`crate::baselines::BaselineUpdate`] next to the primary result.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("nutrition data unavailable: {0}")]
    LookupUnavailable(String),

    #[error("food not recognized: {0}")]
    FoodNotRecognized(String),

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("meal log not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::LookupUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::FoodNotRecognized(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::Unavailable(reason) => AppError::LookupUnavailable(reason),
            LookupError::NotRecognized(food) => AppError::FoodNotRecognized(food),
        }
    }
}

impl From<AppError> for (StatusCode, String) {
    fn from(e: AppError) -> Self {
        let status = e.status();
        match e {
            AppError::Storage(inner) => {
                error!(error = %inner, "storage failure");
                (status, "internal error".into())
            }
            AppError::LookupUnavailable(reason) => {
                error!(%reason, "nutrition lookup unavailable");
                (status, "nutrition data unavailable".into())
            }
            other => (status, other.to_string()),
        }
    }
}
