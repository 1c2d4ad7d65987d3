use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::meal_key;

/// Learned calorie baseline for one (user, meal name) pair.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserMealBaseline {
    pub user_id: Uuid,
    pub meal_key: String,
    pub baseline_calories: i32,
    pub sample_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait BaselineStore: Send + Sync {
    /// Meal names match case-insensitively.
    async fn get(&self, user_id: Uuid, meal_name: &str) -> anyhow::Result<Option<UserMealBaseline>>;

    /// Writes the new mean; the stored sample count never decreases.
    async fn upsert(
        &self,
        user_id: Uuid,
        meal_name: &str,
        baseline_calories: i32,
        sample_count: i32,
    ) -> anyhow::Result<UserMealBaseline>;
}

// A concurrent writer with an older, smaller history cannot shrink the count.
const UPSERT_SQL: &str = r#"
    INSERT INTO user_meal_baselines (user_id, meal_key, baseline_calories, sample_count)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id, meal_key) DO UPDATE
       SET baseline_calories = EXCLUDED.baseline_calories,
           sample_count = GREATEST(user_meal_baselines.sample_count, EXCLUDED.sample_count),
           updated_at = now()
    RETURNING user_id, meal_key, baseline_calories, sample_count, updated_at
"#;

#[derive(Clone)]
pub struct PgBaselineStore {
    db: PgPool,
}

impl PgBaselineStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaselineStore for PgBaselineStore {
    async fn get(
        &self,
        user_id: Uuid,
        meal_name: &str,
    ) -> anyhow::Result<Option<UserMealBaseline>> {
        let row = sqlx::query_as::<_, UserMealBaseline>(
            r#"
            SELECT user_id, meal_key, baseline_calories, sample_count, updated_at
              FROM user_meal_baselines
             WHERE user_id = $1 AND meal_key = $2
            "#,
        )
        .bind(user_id)
        .bind(meal_key(meal_name))
        .fetch_optional(&self.db)
        .await
        .context("select meal baseline")?;
        Ok(row)
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        meal_name: &str,
        baseline_calories: i32,
        sample_count: i32,
    ) -> anyhow::Result<UserMealBaseline> {
        let row = sqlx::query_as::<_, UserMealBaseline>(UPSERT_SQL)
        .bind(user_id)
        .bind(meal_key(meal_name))
        .bind(baseline_calories)
        .bind(sample_count)
        .fetch_one(&self.db)
        .await
        .context("upsert meal baseline")?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::InMemoryBaselines;

    #[test]
    fn upsert_keeps_the_larger_sample_count() {
        assert!(UPSERT_SQL.contains("ON CONFLICT (user_id, meal_key) DO UPDATE"));
        assert!(UPSERT_SQL
            .contains("GREATEST(user_meal_baselines.sample_count, EXCLUDED.sample_count)"));
        assert!(UPSERT_SQL.contains("baseline_calories = EXCLUDED.baseline_calories"));
    }

    #[tokio::test]
    async fn sample_count_never_decreases() {
        let store: Arc<dyn BaselineStore> = Arc::new(InMemoryBaselines::default());
        let user = Uuid::new_v4();

        let first = store.upsert(user, "Dal Tadka", 240, 6).await.unwrap();
        assert_eq!((first.baseline_calories, first.sample_count), (240, 6));

        let second = store.upsert(user, "dal tadka ", 210, 3).await.unwrap();
        assert_eq!((second.baseline_calories, second.sample_count), (210, 6));

        let stored = store.get(user, "DAL TADKA").await.unwrap().unwrap();
        assert_eq!((stored.baseline_calories, stored.sample_count), (210, 6));
        assert_eq!(stored.meal_key, "dal tadka");
    }
}
