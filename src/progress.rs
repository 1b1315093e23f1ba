//! Daily progress against goals, as a pure view over totals + goal set.

use crate::meals::types::{GoalSet, MacroTotals};

pub const BAR_SEGMENTS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientProgress {
    pub actual: f64,
    pub goal: f64,
    pub percent: f64,
    /// Filled segments of a fixed 10-slot bar, always in 0..=10 even when
    /// the goal is exceeded or zero.
    pub bar_filled: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fat: NutrientProgress,
}

/// `None` means "no data": either no goals are set or nothing has been
/// logged for the day. The caller decides how to present that; zeroed
/// percentages would be misleading.
pub fn report(
    goals: Option<&GoalSet>,
    totals: &MacroTotals,
    has_meals: bool,
) -> Option<ProgressReport> {
    let goals = goals?;
    if !has_meals {
        return None;
    }
    Some(ProgressReport {
        calories: nutrient(totals.calories, goals.calories as f64),
        protein: nutrient(totals.protein, goals.protein_g as f64),
        carbs: nutrient(totals.carbs, goals.carbs_g as f64),
        fat: nutrient(totals.fat, goals.fat_g as f64),
    })
}

fn nutrient(actual: f64, goal: f64) -> NutrientProgress {
    let percent = if goal > 0.0 { actual / goal * 100.0 } else { 0.0 };
    let bar_filled = ((percent / 10.0).floor() as i64).clamp(0, BAR_SEGMENTS as i64) as u8;
    NutrientProgress {
        actual,
        goal,
        percent,
        bar_filled,
    }
}
