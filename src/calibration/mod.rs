pub mod handlers;
pub mod repo;

use axum::{routing::get, Router};

use crate::state::AppState;

pub use repo::{CalibrationStore, PgCalibrationStore};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/calibration",
        get(handlers::get_calibration).post(handlers::save_calibration),
    )
}
