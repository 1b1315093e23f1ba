use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::types::MealEvent;
use crate::store::{NutritionStore, StoreResult};
use crate::vision::MealAnalysis;

/// Turns a successful analysis into one immutable meal event and records
/// it. The store keeps the event insert and the daily-totals rebuild in a
/// single transaction, so a reader never sees one without the other.
pub async fn log_meal(
    store: &dyn NutritionStore,
    user_id: &str,
    analysis: &MealAnalysis,
    image_url: Option<&str>,
) -> StoreResult<MealEvent> {
    let now = OffsetDateTime::now_utc();
    let event = MealEvent {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        date: now.date(),
        logged_at: now,
        food_items: analysis.food_items.clone(),
        calories: analysis.calories,
        protein: analysis.protein,
        carbs: analysis.carbs,
        fat: analysis.fat,
        source_text: analysis.analysis_text.clone(),
        image_url: image_url.map(str::to_string),
    };
    store.record_meal(&event).await?;
    info!(%user_id, calories = event.calories, "meal logged");
    Ok(event)
}
