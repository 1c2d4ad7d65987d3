use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::repo::UtensilCalibration;
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SaveCalibrationRequest {
    #[serde(default)]
    pub calibration: Vec<UtensilCalibration>,
}

#[derive(Debug, Serialize)]
pub struct CalibrationResponse {
    pub calibration: Vec<UtensilCalibration>,
    pub is_default: bool,
}

/// POST /calibration; every entry is validated before any is saved.
#[instrument(skip(state, body))]
pub async fn save_calibration(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SaveCalibrationRequest>,
) -> Result<Json<CalibrationResponse>, (StatusCode, String)> {
    let entries = validate(body.calibration)?;
    state
        .calibrations
        .save_all(user_id, &entries)
        .await
        .map_err(AppError::from)?;
    info!(%user_id, saved = entries.len(), "utensil calibration saved");
    load(&state, user_id).await
}

/// GET /calibration; falls back to the default container table.
#[instrument(skip(state))]
pub async fn get_calibration(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CalibrationResponse>, (StatusCode, String)> {
    load(&state, user_id).await
}

async fn load(
    state: &AppState,
    user_id: uuid::Uuid,
) -> Result<Json<CalibrationResponse>, (StatusCode, String)> {
    let saved = state.calibrations.list(user_id).await.map_err(AppError::from)?;
    if !saved.is_empty() {
        return Ok(Json(CalibrationResponse {
            calibration: saved,
            is_default: false,
        }));
    }
    let defaults = state
        .tables
        .units
        .utensil_defaults()
        .iter()
        .map(|(utensil_type, grams)| UtensilCalibration {
            utensil_type: utensil_type.clone(),
            grams_per_unit: *grams,
        })
        .collect();
    Ok(Json(CalibrationResponse {
        calibration: defaults,
        is_default: true,
    }))
}

fn validate(entries: Vec<UtensilCalibration>) -> Result<Vec<UtensilCalibration>, AppError> {
    if entries.is_empty() {
        return Err(AppError::invalid("calibration", "at least one utensil is required"));
    }
    entries
        .into_iter()
        .map(|mut entry| {
            entry.utensil_type = entry.utensil_type.trim().to_string();
            if entry.utensil_type.is_empty() {
                return Err(AppError::invalid("utensil_type", "must not be empty"));
            }
            if !entry.grams_per_unit.is_finite() || entry.grams_per_unit <= 0.0 {
                return Err(AppError::invalid("grams_per_unit", "must be positive"));
            }
            Ok(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, StubGateway};

    fn cal(name: &str, grams: f64) -> UtensilCalibration {
        UtensilCalibration {
            utensil_type: name.into(),
            grams_per_unit: grams,
        }
    }

    #[test]
    fn rejects_empty_and_non_positive() {
        assert!(matches!(
            validate(vec![]),
            Err(AppError::InvalidInput { field: "calibration", .. })
        ));
        assert!(matches!(
            validate(vec![cal("Medium Bowl (~150ml)", 0.0)]),
            Err(AppError::InvalidInput { field: "grams_per_unit", .. })
        ));
        assert!(matches!(
            validate(vec![cal("   ", 120.0)]),
            Err(AppError::InvalidInput { field: "utensil_type", .. })
        ));
    }

    #[test]
    fn trims_utensil_names() {
        let ok = validate(vec![cal(" Glass (~200ml) ", 220.0)]).unwrap();
        assert_eq!(ok, vec![cal("Glass (~200ml)", 220.0)]);
    }

    #[tokio::test]
    async fn failed_batch_saves_nothing() {
        let h = Harness::new(StubGateway::default());
        let user = uuid::Uuid::new_v4();
        h.calibrations.reject("Glass (~200ml)");
        let body = SaveCalibrationRequest {
            calibration: vec![cal("Medium Bowl (~150ml)", 180.0), cal("Glass (~200ml)", 220.0)],
        };

        let (status, _) = save_calibration(State(h.state.clone()), AuthUser(user), Json(body))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.state.calibrations.list(user).await.unwrap().is_empty());

        let body = SaveCalibrationRequest {
            calibration: vec![cal("Medium Bowl (~150ml)", 180.0), cal("Plate (~300ml)", 320.0)],
        };
        let Json(saved) = save_calibration(State(h.state.clone()), AuthUser(user), Json(body))
            .await
            .unwrap();
        assert!(!saved.is_default);
        assert_eq!(
            saved.calibration,
            vec![cal("Medium Bowl (~150ml)", 180.0), cal("Plate (~300ml)", 320.0)]
        );
    }
}
