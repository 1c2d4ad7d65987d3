use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Grams held by one of the user's serving containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UtensilCalibration {
    pub utensil_type: String,
    pub grams_per_unit: f64,
}

#[async_trait]
pub trait CalibrationStore: Send + Sync {
    async fn grams_per_unit(
        &self,
        user_id: Uuid,
        utensil_type: &str,
    ) -> anyhow::Result<Option<f64>>;
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<UtensilCalibration>>;
    /// Inserts or replaces each utensil's calibration; either all are saved or none.
    async fn save_all(
        &self,
        user_id: Uuid,
        calibrations: &[UtensilCalibration],
    ) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgCalibrationStore {
    db: PgPool,
}

impl PgCalibrationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CalibrationStore for PgCalibrationStore {
    async fn grams_per_unit(
        &self,
        user_id: Uuid,
        utensil_type: &str,
    ) -> anyhow::Result<Option<f64>> {
        let row = sqlx::query_as::<_, (f64,)>(
            r#"
            SELECT grams_per_unit
              FROM utensil_calibrations
             WHERE user_id = $1 AND utensil_type = $2
            "#,
        )
        .bind(user_id)
        .bind(utensil_type)
        .fetch_optional(&self.db)
        .await
        .context("select utensil calibration")?;
        Ok(row.map(|(grams,)| grams))
    }

    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<UtensilCalibration>> {
        let rows = sqlx::query_as::<_, UtensilCalibration>(
            r#"
            SELECT utensil_type, grams_per_unit
              FROM utensil_calibrations
             WHERE user_id = $1
             ORDER BY utensil_type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list utensil calibrations")?;
        Ok(rows)
    }

    async fn save_all(
        &self,
        user_id: Uuid,
        calibrations: &[UtensilCalibration],
    ) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin calibration save")?;
        for calibration in calibrations {
            sqlx::query(
                r#"
                INSERT INTO utensil_calibrations (user_id, utensil_type, grams_per_unit)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, utensil_type) DO UPDATE
                   SET grams_per_unit = EXCLUDED.grams_per_unit,
                       updated_at = now()
                "#,
            )
            .bind(user_id)
            .bind(&calibration.utensil_type)
            .bind(calibration.grams_per_unit)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("save calibration {}", calibration.utensil_type))?;
        }
        tx.commit().await.context("commit calibrations")?;
        Ok(())
    }
}
