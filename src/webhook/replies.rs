//! All user-facing message copy lives here; the core only names replies.

use crate::goals::dialogue::{Macro, Reply, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use crate::meals::types::{MacroTotals, MealEvent};
use crate::progress::{ProgressReport, BAR_SEGMENTS};

pub const WELCOME: &str = "\
👋 Hi! I'm here to help you track your nutrition! 🍎📝

You can:
📸 send me a photo of your food and I'll analyze it
📊 text 'summary' for a daily summary
🎯 text 'set goals' to set daily nutrition goals
📈 text 'goals' to see your progress

Text 'help' anytime for more info! 😊";

pub const HELP: &str = "\
👋 Here's how I can help:

📸 Send a food photo: I'll analyze it and track the nutrition facts
📊 Text 'summary': see today's nutrition summary
🎯 Text 'set goals': set your daily nutrition goals
📈 Text 'goals': see your progress against your goals
❓ Text 'help': show this message again

Happy to help with your nutrition journey! 🌟";

pub const NO_MEALS_TODAY: &str =
    "No meals logged today! Send me a photo of your food to get started. 📸";

pub const NO_PROGRESS_DATA: &str =
    "No goals or tracking data found. Try setting goals and logging meals.";

pub const MEAL_SAVE_FAILED: &str = "Something went wrong logging your meal. Please try again.";

pub const GENERIC_ERROR: &str = "Sorry, something went wrong. Please try again!";

const ASK_CALORIES: &str = "Set your daily calorie target:";
const ASK_PROTEIN: &str = "Set your daily protein target (in grams):";
const ASK_CARBS: &str = "Set your daily carbs target (in grams):";
const ASK_FAT: &str = "Set your daily fat target (in grams):";

pub fn analysis_failed(reason: &str) -> String {
    format!("Sorry, I couldn't analyze that photo: {reason}")
}

/// Renders a dialogue reply to message text.
pub fn dialogue(reply: &Reply) -> String {
    match reply {
        Reply::AskCalories => ASK_CALORIES.into(),
        Reply::AskProtein => ASK_PROTEIN.into(),
        Reply::AskCarbs => ASK_CARBS.into(),
        Reply::AskFat => ASK_FAT.into(),
        Reply::CaloriesMustBePositive => {
            "The calorie target must be a positive number. Try again:".into()
        }
        Reply::ValueTooLarge => "That number is too large for a daily target. Try again:".into(),
        Reply::MacroMustBeNonNegative(m) => {
            let name = match m {
                Macro::Protein => "protein",
                Macro::Carbs => "carbs",
                Macro::Fat => "fat",
            };
            format!("The {name} value can't be negative. Try again:")
        }
        Reply::ProteinExceedsCalories {
            grams,
            kcal,
            ceiling,
        } => format!(
            "{grams}g of protein is {kcal} kcal, more than your daily \
             {ceiling} kcal target. Try again:"
        ),
        Reply::Overflow {
            used,
            ceiling,
            excess,
        } => format!(
            "The calories from protein, carbs and fat ({used} kcal) exceed \
             your daily calorie target ({ceiling} kcal) by {excess} kcal.\n\n\
             What would you like to do?\n1. Start over\n2. Redo the last step"
        ),
        Reply::ChooseRecovery => {
            "Please reply 1 to start over or 2 to redo the last step.".into()
        }
        Reply::NumbersOnly => "Please enter a number.".into(),
        Reply::Committed(goals) => {
            let protein_kcal = goals.protein_g * KCAL_PER_G_PROTEIN;
            let carbs_kcal = goals.carbs_g * KCAL_PER_G_CARBS;
            let fat_kcal = goals.fat_g * KCAL_PER_G_FAT;
            let used = protein_kcal + carbs_kcal + fat_kcal;
            format!(
                "✅ Your new goals are set:\n\n\
                 🔥 Calories: {used}/{} kcal\n\
                 🥩 Protein: {}g ({protein_kcal} kcal)\n\
                 🌾 Carbs: {}g ({carbs_kcal} kcal)\n\
                 🥑 Fat: {}g ({fat_kcal} kcal)\n\n\
                 Text 'goals' to see your progress! 📊",
                goals.calories, goals.protein_g, goals.carbs_g, goals.fat_g
            )
        }
        Reply::CommitFailed => "❌ Something went wrong saving your goals. Please try again.".into(),
    }
}

pub fn meal_logged(event: &MealEvent) -> String {
    let mut msg = String::from("🍳 Meal analysis\n──────────────\n\n");
    for item in &event.food_items {
        msg.push_str(&format!("• {item}\n"));
    }
    if !event.food_items.is_empty() {
        msg.push('\n');
    }
    msg.push_str(&format!(
        "📊 Nutrition facts:\n\
         🔥 Calories: {:.0} kcal\n\
         🥩 Protein: {:.0} g\n\
         🌾 Carbs: {:.0} g\n\
         🥑 Fat: {:.0} g\n",
        event.calories, event.protein, event.carbs, event.fat
    ));
    msg.push_str("\n──────────────\n✅ Meal logged!");
    msg
}

pub fn daily_summary(totals: &MacroTotals) -> String {
    let mut msg = String::from("📊 Daily summary\n──────────────\n");
    msg.push_str(&format!(
        "🔥 Calories: {:.0} kcal\n\
         🥩 Protein: {:.0} g\n\
         🌾 Carbs: {:.0} g\n\
         🥑 Fat: {:.0} g\n",
        totals.calories, totals.protein, totals.carbs, totals.fat
    ));
    msg.push_str("──────────────\n");
    if totals.calories > 0.0 {
        msg.push_str("💪 Keep it up! Remember to photograph every meal");
    } else {
        msg.push_str("📸 Photograph your next meal to keep tracking");
    }
    msg
}

pub fn daily_progress(report: &ProgressReport) -> String {
    let mut msg = String::from("📊 Daily progress:\n");
    msg.push_str(&format!(
        "🔥 Calories: {:.0}/{:.0}\n{}\n\n",
        report.calories.actual,
        report.calories.goal,
        bar(report.calories.bar_filled)
    ));
    msg.push_str(&format!(
        "🥩 Protein: {:.0}/{:.0} g\n{}\n\n",
        report.protein.actual,
        report.protein.goal,
        bar(report.protein.bar_filled)
    ));
    msg.push_str(&format!(
        "🌾 Carbs: {:.0}/{:.0} g\n{}\n\n",
        report.carbs.actual,
        report.carbs.goal,
        bar(report.carbs.bar_filled)
    ));
    msg.push_str(&format!(
        "🥑 Fat: {:.0}/{:.0} g\n{}\n",
        report.fat.actual,
        report.fat.goal,
        bar(report.fat.bar_filled)
    ));
    msg
}

fn bar(filled: u8) -> String {
    let filled = filled.min(BAR_SEGMENTS) as usize;
    "█".repeat(filled) + &"░".repeat(BAR_SEGMENTS as usize - filled)
}

/// Wraps a message in the TwiML envelope Twilio expects back.
pub fn twiml(message: &str) -> String {
    let escaped = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Response><Message>{escaped}</Message></Response>"
    )
}
