use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use time::Date;

use crate::meals::types::{GoalSet, MacroTotals, MealEvent};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage seam for the bot. Core logic only ever talks to this
/// trait; backends must keep `record_meal` atomic per (user, date) so the
/// totals projection never drifts from the meal log.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    /// Idempotent: registering a known user is a no-op.
    async fn register_user(&self, user_id: &str) -> StoreResult<()>;

    /// Appends the event and rebuilds the daily totals row for its
    /// (user, date) key in one transaction.
    async fn record_meal(&self, event: &MealEvent) -> StoreResult<()>;

    /// All-zero totals when no meals exist; use [`has_meals`] to tell
    /// "no data" apart from a zero day.
    ///
    /// [`has_meals`]: NutritionStore::has_meals
    async fn daily_totals(&self, user_id: &str, date: Date) -> StoreResult<MacroTotals>;

    async fn has_meals(&self, user_id: &str, date: Date) -> StoreResult<bool>;

    /// Wholesale upsert: a new goal set fully replaces the previous one.
    async fn set_goals(&self, user_id: &str, goals: &GoalSet) -> StoreResult<()>;

    async fn get_goals(&self, user_id: &str) -> StoreResult<Option<GoalSet>>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NutritionStore for SqliteStore {
    async fn register_user(&self, user_id: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id) VALUES (?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_meal(&self, event: &MealEvent) -> StoreResult<()> {
        let food_items = serde_json::to_string(&event.food_items)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO meals (
                id, user_id, date, logged_at, food_items,
                calories, protein, carbs, fat, source_text, image_url
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.user_id)
        .bind(event.date)
        .bind(event.logged_at)
        .bind(food_items)
        .bind(event.calories)
        .bind(event.protein)
        .bind(event.carbs)
        .bind(event.fat)
        .bind(&event.source_text)
        .bind(&event.image_url)
        .execute(&mut *tx)
        .await?;

        // Rebuild the projection from the log rather than incrementing it, so
        // the totals row can never drift from the events it summarizes.
        sqlx::query(
            r#"
            DELETE FROM daily_totals WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(&event.user_id)
        .bind(event.date)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO daily_totals (user_id, date, calories, protein, carbs, fat)
            SELECT user_id, date, SUM(calories), SUM(protein), SUM(carbs), SUM(fat)
            FROM meals
            WHERE user_id = ? AND date = ?
            GROUP BY user_id, date
            "#,
        )
        .bind(&event.user_id)
        .bind(event.date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn daily_totals(&self, user_id: &str, date: Date) -> StoreResult<MacroTotals> {
        let totals = sqlx::query_as::<_, MacroTotals>(
            r#"
            SELECT calories, protein, carbs, fat
            FROM daily_totals
            WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(totals.unwrap_or_default())
    }

    async fn has_meals(&self, user_id: &str, date: Date) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM meals WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn set_goals(&self, user_id: &str, goals: &GoalSet) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_goals (user_id, calories, protein_g, carbs_g, fat_g)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                calories = excluded.calories,
                protein_g = excluded.protein_g,
                carbs_g = excluded.carbs_g,
                fat_g = excluded.fat_g
            "#,
        )
        .bind(user_id)
        .bind(goals.calories)
        .bind(goals.protein_g)
        .bind(goals.carbs_g)
        .bind(goals.fat_g)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_goals(&self, user_id: &str) -> StoreResult<Option<GoalSet>> {
        let goals = sqlx::query_as::<_, GoalSet>(
            r#"
            SELECT calories, protein_g, carbs_g, fat_g
            FROM user_goals
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(goals)
    }
}
