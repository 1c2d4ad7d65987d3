use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};
use uuid::Uuid;

use super::repo_types::MealLogEntry;
use crate::{
    baselines::BaselineUpdate, error::AppError, estimation::dto::EstimateRequest, nutrition::Macros,
};

#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    #[serde(flatten)]
    pub estimate: EstimateRequest,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LoggedMeal {
    pub meal: MealLogEntry,
    pub base_calories: i32,
    pub adjusted_calories: i32,
    pub used_utensil_conversion: bool,
    pub baseline: BaselineUpdate,
}

#[derive(Debug, Deserialize)]
pub struct CorrectionRequest {
    /// Kept loose so a non-numeric value is reported as invalid input.
    #[serde(default, alias = "percent")]
    pub percent_change: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct CorrectionResponse {
    pub id: Uuid,
    pub corrected: i32,
    pub baseline: BaselineUpdate,
}

#[derive(Debug, Deserialize)]
pub struct MealListQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct DailyLogQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: i64,
    #[serde(flatten)]
    pub macros: Macros,
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub totals: DailyTotals,
    pub meals: Vec<MealLogEntry>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

pub fn parse_date(raw: Option<&str>) -> Result<Option<Date>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| AppError::invalid("date", format!("'{raw}' is not YYYY-MM-DD")))
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}
