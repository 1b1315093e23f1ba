use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One logged meal. Append-only: created once per successful image analysis,
/// never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEvent {
    pub id: Uuid,
    pub user_id: String,
    pub date: Date,
    pub logged_at: OffsetDateTime,
    pub food_items: Vec<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub source_text: String,
    pub image_url: Option<String>,
}

/// Materialized per-(user, day) sums over the meal log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Daily targets for one user. Replaced wholesale on every commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GoalSet {
    pub calories: i64,
    pub protein_g: i64,
    pub carbs_g: i64,
    pub fat_g: i64,
}
