use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    estimation::{category::Category, multiplier::PreparationContext, units::Unit},
    nutrition::Macros,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(format!(
                "unknown meal type '{other}', expected breakfast, lunch, dinner or snack"
            )),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MealLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_name: String,
    pub meal_type: String,
    pub quantity: f64,
    pub unit: String,
    pub oil_type: Option<String>,
    pub dairy_type: Option<String>,
    pub sugar_type: Option<String>,
    pub spice_level: Option<String>,
    pub utensil_type: Option<String>,
    pub cooking_intensity: Option<String>,
    pub ingredients: Option<Json<Vec<String>>>,
    pub category: String,
    pub base_calories: i32,
    pub adjusted_calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub used_baseline: bool,
    pub used_utensil_conversion: bool,
    pub logged_at: OffsetDateTime,
}

/// A logged meal as the rest of the service sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_name: String,
    pub meal_type: MealType,
    pub quantity: f64,
    pub unit: Unit,
    #[serde(flatten)]
    pub context: PreparationContext,
    pub ingredients: Vec<String>,
    pub category: Category,
    pub base_calories: i32,
    pub adjusted_calories: i32,
    pub macros: Macros,
    pub used_baseline: bool,
    pub used_utensil_conversion: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

impl TryFrom<MealLogRow> for MealLogEntry {
    type Error = anyhow::Error;

    fn try_from(r: MealLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            meal_name: r.meal_name,
            meal_type: r.meal_type.parse().map_err(anyhow::Error::msg)?,
            quantity: r.quantity,
            unit: r.unit.parse().map_err(anyhow::Error::msg)?,
            context: PreparationContext {
                oil_type: r.oil_type.into(),
                dairy_type: r.dairy_type.into(),
                cooking_intensity: r.cooking_intensity.into(),
                sugar_type: r.sugar_type,
                spice_level: r.spice_level,
                utensil_type: r.utensil_type,
            },
            ingredients: r.ingredients.map(|Json(v)| v).unwrap_or_default(),
            category: r.category.parse().unwrap_or(Category::Unknown),
            base_calories: r.base_calories,
            adjusted_calories: r.adjusted_calories,
            macros: Macros {
                protein: r.protein_g,
                carbs: r.carbs_g,
                fat: r.fat_g,
                fiber: r.fiber_g,
                sugar: r.sugar_g,
                sodium: r.sodium_mg,
            },
            used_baseline: r.used_baseline,
            used_utensil_conversion: r.used_utensil_conversion,
            logged_at: r.logged_at,
        })
    }
}

/// Everything needed to persist a meal log; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealLog {
    pub user_id: Uuid,
    pub meal_name: String,
    pub meal_type: MealType,
    pub quantity: f64,
    pub unit: Unit,
    pub context: PreparationContext,
    pub ingredients: Vec<String>,
    pub category: Category,
    pub base_calories: i32,
    pub adjusted_calories: i32,
    pub macros: Macros,
    pub used_baseline: bool,
    pub used_utensil_conversion: bool,
}
