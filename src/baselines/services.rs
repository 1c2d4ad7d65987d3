use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::MATURE_SAMPLES;
use crate::state::AppState;

/// Outcome of the best-effort baseline side effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BaselineUpdate {
    /// Not enough history yet.
    Skipped { samples: usize },
    Updated {
        baseline_calories: i32,
        sample_count: i32,
    },
    /// Logged; the primary action still succeeded.
    Failed,
}

pub fn rounded_mean(values: &[i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    Some((sum as f64 / values.len() as f64).round() as i32)
}

/// Recomputes the baseline from the user's full history for `meal_name`
/// once it holds at least [`MATURE_SAMPLES`] logs.
///
/// Callers hold the [`super::KeyLocks`] guard for the meal key.
pub async fn learn_from_history(
    state: &AppState,
    user_id: Uuid,
    meal_name: &str,
) -> BaselineUpdate {
    let logs = match state.meals.list_by_meal_name(user_id, meal_name).await {
        Ok(logs) => logs,
        Err(e) => return failed(e, user_id, meal_name),
    };
    if logs.len() < MATURE_SAMPLES as usize {
        debug!(
            %user_id,
            meal = %meal_name,
            samples = logs.len(),
            "not enough history to learn baseline"
        );
        return BaselineUpdate::Skipped { samples: logs.len() };
    }
    let values: Vec<i32> = logs.iter().map(|l| l.adjusted_calories).collect();
    store(state, user_id, meal_name, &values).await
}

/// Folds a corrected value into the baseline: the mean of the same-name
/// logs as they were before the correction plus the corrected value.
pub async fn fold_correction(
    state: &AppState,
    user_id: Uuid,
    meal_name: &str,
    prior: &[i32],
    corrected: i32,
) -> BaselineUpdate {
    let mut values = Vec::with_capacity(prior.len() + 1);
    values.extend_from_slice(prior);
    values.push(corrected);
    store(state, user_id, meal_name, &values).await
}

async fn store(state: &AppState, user_id: Uuid, meal_name: &str, values: &[i32]) -> BaselineUpdate {
    let Some(mean) = rounded_mean(values) else {
        return BaselineUpdate::Skipped { samples: 0 };
    };
    match state
        .baselines
        .upsert(user_id, meal_name, mean, values.len() as i32)
        .await
    {
        Ok(b) => {
            info!(
                %user_id,
                meal = %b.meal_key,
                calories = b.baseline_calories,
                samples = b.sample_count,
                "baseline updated"
            );
            BaselineUpdate::Updated {
                baseline_calories: b.baseline_calories,
                sample_count: b.sample_count,
            }
        }
        Err(e) => failed(e, user_id, meal_name),
    }
}

fn failed(e: anyhow::Error, user_id: Uuid, meal_name: &str) -> BaselineUpdate {
    warn!(error = %e, %user_id, meal = %meal_name, "baseline update failed");
    BaselineUpdate::Failed
}
