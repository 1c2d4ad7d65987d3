use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{format_date, CorrectionResponse, DailySummary, DailyTotals, LogMealRequest, LoggedMeal},
    repo_types::{MealType, NewMealLog},
};
use crate::{
    baselines::{
        meal_key,
        services::{fold_correction, learn_from_history},
        BaselineUpdate,
    },
    error::AppError,
    estimation::{category::detect, estimate},
    state::AppState,
};

/// Estimates, persists, then lets the baseline learn from the user's
/// history for this meal name.
pub async fn log_meal(
    state: &AppState,
    user_id: Uuid,
    req: LogMealRequest,
) -> Result<LoggedMeal, AppError> {
    let meal_type = req
        .meal_type
        .as_deref()
        .ok_or_else(|| AppError::invalid("meal_type", "is required"))?
        .parse::<MealType>()
        .map_err(|reason| AppError::invalid("meal_type", reason))?;
    let input = req.estimate.into_input()?;
    let category = input
        .category
        .unwrap_or_else(|| detect(&input.food_name).category);

    let est = estimate(state, user_id, &input).await?;

    let ingredients = req
        .ingredients
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    let entry = state
        .meals
        .create(NewMealLog {
            user_id,
            meal_name: input.food_name,
            meal_type,
            quantity: input.quantity,
            unit: input.unit,
            context: input.context,
            ingredients,
            category,
            base_calories: est.base_calories,
            adjusted_calories: est.adjusted_calories,
            macros: est.macros,
            used_baseline: est.used_baseline,
            used_utensil_conversion: est.used_utensil_conversion,
        })
        .await?;
    info!(
        %user_id,
        meal_id = %entry.id,
        meal = %entry.meal_name,
        calories = entry.adjusted_calories,
        "meal logged"
    );

    let baseline = {
        let _guard = state.locks.lock(user_id, &meal_key(&entry.meal_name)).await;
        learn_from_history(state, user_id, &entry.meal_name).await
    };

    Ok(LoggedMeal {
        base_calories: entry.base_calories,
        adjusted_calories: entry.adjusted_calories,
        used_utensil_conversion: entry.used_utensil_conversion,
        meal: entry,
        baseline,
    })
}

/// Largest upward correction, a tenfold increase.
const MAX_PERCENT: f64 = 1_000.0;

/// `None` when the corrected value does not fit the calorie column.
pub fn corrected_calories(current: i32, percent_change: f64) -> Option<i32> {
    let value = (f64::from(current) * (1.0 + percent_change / 100.0)).round();
    (f64::from(i32::MIN)..=f64::from(i32::MAX))
        .contains(&value)
        .then_some(value as i32)
}

fn percent_from(value: &serde_json::Value) -> Result<f64, AppError> {
    let percent = value
        .as_f64()
        .filter(|p| p.is_finite())
        .ok_or_else(|| AppError::invalid("percent_change", "must be a number"))?;
    if percent < -100.0 {
        return Err(AppError::invalid("percent_change", "must not be below -100"));
    }
    if percent > MAX_PERCENT {
        return Err(AppError::invalid("percent_change", format!("must not exceed {MAX_PERCENT}")));
    }
    Ok(percent)
}

/// Rewrites a log's adjusted calories by a signed percentage and folds the
/// result into the user's baseline for that meal name.
pub async fn apply_correction(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    percent_change: &serde_json::Value,
) -> Result<CorrectionResponse, AppError> {
    let percent = percent_from(percent_change)?;
    let target = state.meals.get(user_id, id).await?.ok_or(AppError::NotFound)?;

    let _guard = state.locks.lock(user_id, &meal_key(&target.meal_name)).await;
    // Re-read under the lock so a concurrent correction is not lost.
    let current = state.meals.get(user_id, id).await?.ok_or(AppError::NotFound)?;
    let prior = state
        .meals
        .list_by_meal_name(user_id, &current.meal_name)
        .await;

    let corrected = corrected_calories(current.adjusted_calories, percent)
        .ok_or_else(|| AppError::invalid("percent_change", "corrected calories out of range"))?;
    if !state
        .meals
        .update_adjusted_calories(user_id, id, corrected)
        .await?
    {
        return Err(AppError::NotFound);
    }
    info!(
        %user_id,
        meal_id = %id,
        from = current.adjusted_calories,
        to = corrected,
        percent,
        "correction applied"
    );

    let baseline = match prior {
        Ok(logs) => {
            let values: Vec<i32> = logs.iter().map(|l| l.adjusted_calories).collect();
            fold_correction(state, user_id, &current.meal_name, &values, corrected).await
        }
        Err(e) => {
            warn!(
                error = %e,
                %user_id,
                meal = %current.meal_name,
                "could not load history for baseline"
            );
            BaselineUpdate::Failed
        }
    };

    Ok(CorrectionResponse {
        id,
        corrected,
        baseline,
    })
}

pub async fn daily_summary(
    state: &AppState,
    user_id: Uuid,
    date: Date,
) -> Result<DailySummary, AppError> {
    let meals = state.meals.list_for_day(user_id, date).await?;
    let mut totals = DailyTotals::default();
    for m in &meals {
        totals.calories += i64::from(m.adjusted_calories);
        totals.macros.protein += m.macros.protein;
        totals.macros.carbs += m.macros.carbs;
        totals.macros.fat += m.macros.fat;
        totals.macros.fiber += m.macros.fiber;
        totals.macros.sugar += m.macros.sugar;
        totals.macros.sodium += m.macros.sodium;
    }
    Ok(DailySummary {
        date: format_date(date),
        totals,
        meals,
    })
}
