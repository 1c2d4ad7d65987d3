use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    dto::{Estimate, EstimateInput},
    units::{Portion, Unit},
};
use crate::{
    baselines::{UserMealBaseline, MATURE_SAMPLES},
    error::AppError,
    nutrition::{LookupError, Macros},
    state::AppState,
};

/// Largest portion the gateway is asked about.
const MAX_PORTION_GRAMS: f64 = 100_000.0;

pub fn adjusted_calories(base_calories: i32, multiplier: f64) -> i32 {
    (f64::from(base_calories) * multiplier).round() as i32
}

/// Resolves base calories from a mature personal baseline or the nutrition
/// gateway and applies the preparation multiplier. Nothing is persisted.
pub async fn estimate(
    state: &AppState,
    user_id: Uuid,
    input: &EstimateInput,
) -> Result<Estimate, AppError> {
    let portion = portion(state, user_id, input).await;
    if !portion.grams.is_finite() || portion.grams > MAX_PORTION_GRAMS {
        return Err(AppError::invalid(
            "quantity",
            format!("portion must be at most {MAX_PORTION_GRAMS} grams"),
        ));
    }
    let baseline = baseline(state, user_id, &input.food_name).await;

    let lookup = state
        .nutrition
        .nutrients(&input.food_name, portion.grams, Unit::Grams)
        .await;

    let (base_calories, macros, used_baseline) = match (baseline, lookup) {
        (Some(b), lookup) if b.sample_count >= MATURE_SAMPLES => {
            let macros = lookup.map(|f| f.macros).unwrap_or_else(|e| {
                debug!(
                    error = %e,
                    meal = %input.food_name,
                    "macros unavailable for baseline estimate"
                );
                Macros::default()
            });
            (b.baseline_calories, macros, true)
        }
        (_, Ok(facts)) => (facts.calories, facts.macros, false),
        (Some(b), Err(LookupError::Unavailable(reason))) => {
            warn!(
                %reason,
                %user_id,
                meal = %input.food_name,
                samples = b.sample_count,
                "lookup unavailable, using personal baseline"
            );
            (b.baseline_calories, Macros::default(), true)
        }
        (_, Err(e)) => return Err(e.into()),
    };

    let multiplier = state.tables.multipliers.for_context(&input.context);
    let adjusted = adjusted_calories(base_calories, multiplier);
    info!(
        %user_id,
        meal = %input.food_name,
        grams = portion.grams,
        base_calories,
        adjusted,
        used_baseline,
        "estimate computed"
    );

    Ok(Estimate {
        base_calories,
        adjusted_calories: adjusted,
        multiplier,
        macros,
        used_baseline,
        used_utensil_conversion: portion.utensil_conversion,
        effective_grams: portion.grams,
    })
}

async fn portion(state: &AppState, user_id: Uuid, input: &EstimateInput) -> Portion {
    let utensil = input
        .context
        .utensil_type
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let calibration = match (input.unit, utensil) {
        (Unit::Pieces, Some(utensil)) => state
            .calibrations
            .grams_per_unit(user_id, utensil)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, %user_id, %utensil, "calibration read failed, using defaults");
                None
            }),
        _ => None,
    };
    state
        .tables
        .units
        .resolve(input.quantity, input.unit, utensil, calibration)
}

async fn baseline(state: &AppState, user_id: Uuid, meal_name: &str) -> Option<UserMealBaseline> {
    state
        .baselines
        .get(user_id, meal_name)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, %user_id, meal = %meal_name, "baseline read failed");
            None
        })
}
