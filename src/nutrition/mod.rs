pub mod handlers;
pub mod nutritionix;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{estimation::units::Unit, state::AppState};

pub use nutritionix::Nutritionix;

/// Macro nutrients for a portion; grams except sodium (mg).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionFacts {
    pub calories: i32,
    pub macros: Macros,
}

/// A catalogue entry returned by food search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodMatch {
    pub food_name: String,
    pub serving_unit: String,
    pub serving_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// Provider unreachable, timed out, misconfigured, or erroring.
    #[error("nutrition provider unavailable: {0}")]
    Unavailable(String),
    /// Provider answered but matched no food.
    #[error("no food matched '{0}'")]
    NotRecognized(String),
}

#[async_trait]
pub trait NutritionGateway: Send + Sync {
    async fn nutrients(
        &self,
        food_name: &str,
        quantity: f64,
        unit: Unit,
    ) -> Result<NutritionFacts, LookupError>;

    async fn search(&self, query: &str) -> Result<Vec<FoodMatch>, LookupError>;
}

pub fn router() -> Router<AppState> {
    Router::new().route("/food-search", get(handlers::food_search))
}
