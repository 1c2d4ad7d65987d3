use serde::{Deserialize, Serialize};

use super::{category::Category, multiplier::PreparationContext, units::Unit};
use crate::{error::AppError, nutrition::Macros};

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    #[serde(default, alias = "q", alias = "meal_name")]
    pub food_name: Option<String>,
    /// Kept loose so a non-numeric value is reported as invalid input.
    #[serde(default)]
    pub quantity: serde_json::Value,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(flatten)]
    pub context: PreparationContext,
    #[serde(default)]
    pub category: Option<String>,
}

/// Largest quantity accepted in any unit.
pub const MAX_QUANTITY: f64 = 10_000.0;

/// Validated estimate input.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateInput {
    pub food_name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub context: PreparationContext,
    pub category: Option<Category>,
}

impl EstimateRequest {
    pub fn into_input(self) -> Result<EstimateInput, AppError> {
        let food_name = self
            .food_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::invalid("food_name", "is required"))?;
        let quantity = match &self.quantity {
            serde_json::Value::Null => return Err(AppError::invalid("quantity", "is required")),
            value => value
                .as_f64()
                .filter(|q| q.is_finite() && *q > 0.0)
                .ok_or_else(|| AppError::invalid("quantity", "must be a positive number"))?,
        };
        if quantity > MAX_QUANTITY {
            return Err(AppError::invalid("quantity", format!("must be at most {MAX_QUANTITY}")));
        }
        let unit = self
            .unit
            .ok_or_else(|| AppError::invalid("unit", "is required"))?
            .parse::<Unit>()
            .map_err(|reason| AppError::invalid("unit", reason))?;
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.parse::<Category>())
            .transpose()
            .map_err(|reason| AppError::invalid("category", reason))?;
        Ok(EstimateInput {
            food_name,
            quantity,
            unit,
            context: self.context,
            category,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub base_calories: i32,
    pub adjusted_calories: i32,
    pub multiplier: f64,
    #[serde(flatten)]
    pub macros: Macros,
    pub used_baseline: bool,
    pub used_utensil_conversion: bool,
    pub effective_grams: f64,
}

#[derive(Debug, Deserialize)]
pub struct DetectCategoryRequest {
    #[serde(default, alias = "food_name", alias = "meal_name")]
    pub name: Option<String>,
}
