use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    baselines::{BaselineStore, KeyLocks, PgBaselineStore},
    calibration::{CalibrationStore, PgCalibrationStore},
    config::AppConfig,
    estimation::EstimationTables,
    meals::{MealLogStore, PgMealLogStore},
    nutrition::{NutritionGateway, Nutritionix},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tables: Arc<EstimationTables>,
    pub nutrition: Arc<dyn NutritionGateway>,
    pub meals: Arc<dyn MealLogStore>,
    pub baselines: Arc<dyn BaselineStore>,
    pub calibrations: Arc<dyn CalibrationStore>,
    pub locks: Arc<KeyLocks>,
}

impl AppState {
    pub fn from_pool(config: Arc<AppConfig>, db: PgPool) -> anyhow::Result<Self> {
        let nutrition = Arc::new(Nutritionix::new(&config.nutrition)?) as Arc<dyn NutritionGateway>;
        Ok(Self::from_parts(
            config,
            nutrition,
            Arc::new(PgMealLogStore::new(db.clone())),
            Arc::new(PgBaselineStore::new(db.clone())),
            Arc::new(PgCalibrationStore::new(db)),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        nutrition: Arc<dyn NutritionGateway>,
        meals: Arc<dyn MealLogStore>,
        baselines: Arc<dyn BaselineStore>,
        calibrations: Arc<dyn CalibrationStore>,
    ) -> Self {
        Self {
            config,
            tables: Arc::new(EstimationTables::default()),
            nutrition,
            meals,
            baselines,
            calibrations,
            locks: Arc::new(KeyLocks::new()),
        }
    }

    /// In-memory stores and a gateway that knows no foods.
    #[cfg(test)]
    pub fn fake() -> Self {
        crate::testing::Harness::new(crate::testing::StubGateway::default()).state
    }
}
