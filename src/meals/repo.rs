use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::{Date, Duration, OffsetDateTime, Time};
use uuid::Uuid;

use super::repo_types::{MealLogEntry, MealLogRow, NewMealLog};
use crate::baselines::meal_key;

#[async_trait]
pub trait MealLogStore: Send + Sync {
    async fn create(&self, new: NewMealLog) -> anyhow::Result<MealLogEntry>;

    /// Only returns the log when it belongs to `user_id`.
    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealLogEntry>>;

    /// Newest first, optionally restricted to one UTC day.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        day: Option<Date>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<MealLogEntry>>;

    async fn list_for_day(&self, user_id: Uuid, day: Date) -> anyhow::Result<Vec<MealLogEntry>>;

    /// All of the user's logs whose name matches case-insensitively, oldest first.
    async fn list_by_meal_name(
        &self,
        user_id: Uuid,
        meal_name: &str,
    ) -> anyhow::Result<Vec<MealLogEntry>>;

    async fn update_adjusted_calories(
        &self,
        user_id: Uuid,
        id: Uuid,
        calories: i32,
    ) -> anyhow::Result<bool>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

/// `[start, end)` of a UTC calendar day.
pub fn day_bounds(day: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = day.with_time(Time::MIDNIGHT).assume_utc();
    (start, start + Duration::days(1))
}

const COLUMNS: &str = r#"
    id, user_id, meal_name, meal_type, quantity, unit,
    oil_type, dairy_type, sugar_type, spice_level, utensil_type, cooking_intensity,
    ingredients, category, base_calories, adjusted_calories,
    protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg,
    used_baseline, used_utensil_conversion, logged_at
"#;

#[derive(Clone)]
pub struct PgMealLogStore {
    db: PgPool,
}

impl PgMealLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_entries(rows: Vec<MealLogRow>) -> anyhow::Result<Vec<MealLogEntry>> {
    rows.into_iter().map(MealLogEntry::try_from).collect()
}

#[async_trait]
impl MealLogStore for PgMealLogStore {
    async fn create(&self, new: NewMealLog) -> anyhow::Result<MealLogEntry> {
        let sql = format!(
            r#"
            INSERT INTO meal_logs (
                id, user_id, meal_name, meal_type, quantity, unit,
                oil_type, dairy_type, sugar_type, spice_level, utensil_type, cooking_intensity,
                ingredients, category, base_calories, adjusted_calories,
                protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg,
                used_baseline, used_utensil_conversion
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            RETURNING {COLUMNS}
            "#
        );
        let ctx = &new.context;
        let row = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(&new.meal_name)
            .bind(new.meal_type.as_str())
            .bind(new.quantity)
            .bind(new.unit.as_str())
            .bind(ctx.oil_type.label())
            .bind(ctx.dairy_type.label())
            .bind(ctx.sugar_type.as_deref())
            .bind(ctx.spice_level.as_deref())
            .bind(ctx.utensil_type.as_deref())
            .bind(ctx.cooking_intensity.label())
            .bind(Json(&new.ingredients))
            .bind(new.category.as_str())
            .bind(new.base_calories)
            .bind(new.adjusted_calories)
            .bind(new.macros.protein)
            .bind(new.macros.carbs)
            .bind(new.macros.fat)
            .bind(new.macros.fiber)
            .bind(new.macros.sugar)
            .bind(new.macros.sodium)
            .bind(new.used_baseline)
            .bind(new.used_utensil_conversion)
            .fetch_one(&self.db)
            .await
            .context("insert meal log")?;
        MealLogEntry::try_from(row)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealLogEntry>> {
        let sql = format!("SELECT {COLUMNS} FROM meal_logs WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("select meal log")?;
        row.map(MealLogEntry::try_from).transpose()
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        day: Option<Date>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<MealLogEntry>> {
        let (from, until) = match day.map(day_bounds) {
            Some((from, until)) => (Some(from), Some(until)),
            None => (None, None),
        };
        let sql = format!(
            r#"
            SELECT {COLUMNS}
              FROM meal_logs
             WHERE user_id = $1
               AND ($2::timestamptz IS NULL OR logged_at >= $2)
               AND ($3::timestamptz IS NULL OR logged_at < $3)
             ORDER BY logged_at DESC
             LIMIT $4 OFFSET $5
            "#
        );
        let rows = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(until)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .context("list meal logs")?;
        into_entries(rows)
    }

    async fn list_for_day(&self, user_id: Uuid, day: Date) -> anyhow::Result<Vec<MealLogEntry>> {
        let (from, until) = day_bounds(day);
        let sql = format!(
            r#"
            SELECT {COLUMNS}
              FROM meal_logs
             WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
             ORDER BY logged_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(until)
            .fetch_all(&self.db)
            .await
            .context("list meal logs for day")?;
        into_entries(rows)
    }

    async fn list_by_meal_name(
        &self,
        user_id: Uuid,
        meal_name: &str,
    ) -> anyhow::Result<Vec<MealLogEntry>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
              FROM meal_logs
             WHERE user_id = $1 AND lower(btrim(meal_name)) = $2
             ORDER BY logged_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(user_id)
            .bind(meal_key(meal_name))
            .fetch_all(&self.db)
            .await
            .context("list meal logs by name")?;
        into_entries(rows)
    }

    async fn update_adjusted_calories(
        &self,
        user_id: Uuid,
        id: Uuid,
        calories: i32,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE meal_logs SET adjusted_calories = $3 WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(calories)
        .execute(&self.db)
        .await
        .context("update adjusted calories")?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM meal_logs WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete meal log")?;
        Ok(res.rows_affected() == 1)
    }
}
