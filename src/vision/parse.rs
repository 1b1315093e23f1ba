//! Extracts structured nutrition facts from the model's analysis text.
//!
//! The prompt asks for food items bulleted under an `Items:` heading and
//! `Calories/Protein/Carbs/Fat: N` lines; models still wander (bold
//! markers, `~`/`about` hedges), so the regexes tolerate decoration and
//! missing values default to zero.

use lazy_static::lazy_static;
use regex::Regex;

use super::MealAnalysis;

lazy_static! {
    static ref CALORIES_RE: Regex = macro_pattern("calories");
    static ref PROTEIN_RE: Regex = macro_pattern("protein");
    static ref CARBS_RE: Regex = macro_pattern(r"carb(?:ohydrate)?s?");
    static ref FAT_RE: Regex = macro_pattern("fat");
}

fn macro_pattern(label: &str) -> Regex {
    let pattern = format!(r"(?i)\*{{0,2}}{label}\*{{0,2}}\s*:?\s*(?:~|about\s+)?(\d+)");
    Regex::new(&pattern).expect("valid macro pattern")
}

pub fn extract(analysis_text: &str) -> MealAnalysis {
    MealAnalysis {
        analysis_text: analysis_text.to_string(),
        food_items: food_items(analysis_text),
        calories: macro_value(&CALORIES_RE, analysis_text),
        protein: macro_value(&PROTEIN_RE, analysis_text),
        carbs: macro_value(&CARBS_RE, analysis_text),
        fat: macro_value(&FAT_RE, analysis_text),
    }
}

fn macro_value(re: &Regex, text: &str) -> f64 {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn food_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut capturing = false;
    for line in text.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();
        if lower.contains("items:") {
            capturing = true;
            continue;
        }
        if lower.contains("nutrition") {
            capturing = false;
        }
        if capturing {
            if let Some(item) = line.strip_prefix('-').or_else(|| line.strip_prefix('•')) {
                let item = item.trim();
                if !item.is_empty() {
                    items.push(item.to_string());
                }
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Items:
- 2 scrambled eggs
- 1 slice whole-wheat toast
- half an avocado

Nutrition facts:
- **Calories**: ~420
- **Protein**: 22 g
- **Carbs**: 28 g
- **Fat**: 24 g";

    #[test]
    fn extracts_items_and_macros() {
        let analysis = extract(SAMPLE);
        assert_eq!(
            analysis.food_items,
            vec![
                "2 scrambled eggs",
                "1 slice whole-wheat toast",
                "half an avocado",
            ]
        );
        assert_eq!(analysis.calories, 420.0);
        assert_eq!(analysis.protein, 22.0);
        assert_eq!(analysis.carbs, 28.0);
        assert_eq!(analysis.fat, 24.0);
        assert_eq!(analysis.analysis_text, SAMPLE);
    }

    #[test]
    fn tolerates_plain_labels_and_carbohydrates_spelling() {
        let text = "Items:\n- rice bowl\nNutrition facts:\nCalories: about 510\nProtein: 18g\nCarbohydrates: 70 g\nFat: 12";
        let analysis = extract(text);
        assert_eq!(analysis.calories, 510.0);
        assert_eq!(analysis.protein, 18.0);
        assert_eq!(analysis.carbs, 70.0);
        assert_eq!(analysis.fat, 12.0);
    }

    #[test]
    fn missing_values_default_to_zero() {
        let analysis = extract("I couldn't make out much in this photo.");
        assert!(analysis.food_items.is_empty());
        assert_eq!(analysis.calories, 0.0);
        assert_eq!(analysis.fat, 0.0);
    }
}
