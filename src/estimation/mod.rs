pub mod category;
pub mod dto;
pub mod handlers;
pub mod multiplier;
pub mod orchestrator;
pub mod units;

use axum::{routing::post, Router};

use crate::state::AppState;

use multiplier::MultiplierTable;
use units::UnitTable;

pub use orchestrator::estimate;

/// Immutable conversion data shared by every request.
#[derive(Debug, Clone, Default)]
pub struct EstimationTables {
    pub units: UnitTable,
    pub multipliers: MultiplierTable,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/estimate", post(handlers::estimate_preview))
        .route("/detect-category", post(handlers::detect_category))
}
