pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub use repo::{MealLogStore, PgMealLogStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meals", get(handlers::list_meals).post(handlers::log_meal))
        .route("/meals/:id", get(handlers::get_meal).delete(handlers::delete_meal))
        .route("/meals/:id/correction", post(handlers::apply_correction))
        .route("/daily-log", get(handlers::daily_log))
}
