//! Goal-setting conversation, as a pure transition function.
//!
//! The bot collects four daily targets one message at a time: calories,
//! then protein, carbs and fat in grams. Protein and carbs count 4 kcal
//! per gram, fat 9; the running macro-calorie sum may never exceed the
//! calorie target, checked at every step so the user hears about an
//! overshoot as early as possible. On overflow the conversation parks in
//! an error state offering "1" (start over) or "2" (redo the last macro).
//!
//! No I/O here: [`advance`] maps (state, input) to the next state, the
//! reply to send, and an optional finished [`GoalSet`] for the caller to
//! commit.

use crate::meals::types::GoalSet;

pub const KCAL_PER_G_PROTEIN: i64 = 4;
pub const KCAL_PER_G_CARBS: i64 = 4;
pub const KCAL_PER_G_FAT: i64 = 9;

/// Upper bound on any accepted target value. With every stored field capped,
/// the 4/4/9 kcal products and sums stay far below `i64::MAX`.
pub const MAX_VALUE: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    Calories,
    Protein,
    Carbs,
    Fat,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Macro {
    Protein,
    Carbs,
    Fat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueState {
    pub step: Step,
    pub calories: Option<i64>,
    pub protein: Option<i64>,
    pub carbs: Option<i64>,
    pub fat: Option<i64>,
}

impl DialogueState {
    pub fn start() -> Self {
        Self::default()
    }

    /// Macro calories over whatever fields are currently set. On the error
    /// recovery path this intentionally includes fields from steps past the
    /// one being redone (matches the shipped behavior of the bot).
    fn used_kcal(&self) -> i64 {
        self.protein.unwrap_or(0) * KCAL_PER_G_PROTEIN
            + self.carbs.unwrap_or(0) * KCAL_PER_G_CARBS
            + self.fat.unwrap_or(0) * KCAL_PER_G_FAT
    }
}

/// What to tell the user. Rendering to message text lives in the webhook
/// layer; the machine only names the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    AskCalories,
    AskProtein,
    AskCarbs,
    AskFat,
    CaloriesMustBePositive,
    MacroMustBeNonNegative(Macro),
    ValueTooLarge,
    ProteinExceedsCalories {
        grams: i64,
        kcal: i64,
        ceiling: i64,
    },
    Overflow {
        used: i64,
        ceiling: i64,
        excess: i64,
    },
    ChooseRecovery,
    NumbersOnly,
    Committed(GoalSet),
    CommitFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// `None` means the conversation is over (successful commit).
    pub next: Option<DialogueState>,
    pub reply: Reply,
    /// Set only when all four fields passed validation. The caller commits
    /// it atomically; on a failed commit it must keep the prior state.
    pub commit: Option<GoalSet>,
}

impl Turn {
    fn stay(state: DialogueState, reply: Reply) -> Self {
        Self {
            next: Some(state),
            reply,
            commit: None,
        }
    }
}

pub fn advance(mut state: DialogueState, input: &str) -> Turn {
    let input = input.trim();

    if state.step == Step::Error {
        return recover(state, input);
    }

    let Ok(value) = input.parse::<i64>() else {
        return Turn::stay(state, Reply::NumbersOnly);
    };

    let ceiling = state.calories.unwrap_or(0);

    match state.step {
        Step::Calories => {
            if value <= 0 {
                return Turn::stay(state, Reply::CaloriesMustBePositive);
            }
            if value > MAX_VALUE {
                return Turn::stay(state, Reply::ValueTooLarge);
            }
            state.calories = Some(value);
            state.step = Step::Protein;
            Turn::stay(state, Reply::AskProtein)
        }
        Step::Protein => {
            if value < 0 {
                return Turn::stay(state, Reply::MacroMustBeNonNegative(Macro::Protein));
            }
            if value > MAX_VALUE {
                return Turn::stay(state, Reply::ValueTooLarge);
            }
            let kcal = value * KCAL_PER_G_PROTEIN;
            if kcal > ceiling {
                return Turn::stay(
                    state,
                    Reply::ProteinExceedsCalories {
                        grams: value,
                        kcal,
                        ceiling,
                    },
                );
            }
            state.protein = Some(value);
            state.step = Step::Carbs;
            Turn::stay(state, Reply::AskCarbs)
        }
        Step::Carbs => {
            if value < 0 {
                return Turn::stay(state, Reply::MacroMustBeNonNegative(Macro::Carbs));
            }
            if value > MAX_VALUE {
                return Turn::stay(state, Reply::ValueTooLarge);
            }
            state.carbs = Some(value);
            let used = state.used_kcal();
            if used > ceiling {
                state.step = Step::Error;
                return Turn::stay(
                    state,
                    Reply::Overflow {
                        used,
                        ceiling,
                        excess: used - ceiling,
                    },
                );
            }
            state.step = Step::Fat;
            Turn::stay(state, Reply::AskFat)
        }
        Step::Fat => {
            if value < 0 {
                return Turn::stay(state, Reply::MacroMustBeNonNegative(Macro::Fat));
            }
            if value > MAX_VALUE {
                return Turn::stay(state, Reply::ValueTooLarge);
            }
            state.fat = Some(value);
            let used = state.used_kcal();
            if used > ceiling {
                state.step = Step::Error;
                return Turn::stay(
                    state,
                    Reply::Overflow {
                        used,
                        ceiling,
                        excess: used - ceiling,
                    },
                );
            }
            let goals = GoalSet {
                calories: ceiling,
                protein_g: state.protein.unwrap_or(0),
                carbs_g: state.carbs.unwrap_or(0),
                fat_g: value,
            };
            Turn {
                next: None,
                reply: Reply::Committed(goals),
                commit: Some(goals),
            }
        }
        Step::Error => unreachable!("handled above"),
    }
}

fn recover(mut state: DialogueState, input: &str) -> Turn {
    match input {
        "1" => Turn::stay(DialogueState::start(), Reply::AskCalories),
        "2" => {
            // Redo the most recently supplied macro: the field chosen by
            // inspecting which values are set, not by which step failed.
            if state.fat.is_some() {
                state.step = Step::Fat;
                Turn::stay(state, Reply::AskFat)
            } else if state.carbs.is_some() {
                state.step = Step::Carbs;
                Turn::stay(state, Reply::AskCarbs)
            } else {
                Turn::stay(DialogueState::start(), Reply::AskCalories)
            }
        }
        _ => Turn::stay(state, Reply::ChooseRecovery),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(inputs: &[&str]) -> (Option<DialogueState>, Turn) {
        let mut state = Some(DialogueState::start());
        let mut last = None;
        for input in inputs {
            let cur = state.clone().expect("dialogue ended early");
            let turn = advance(cur, input);
            state = turn.next.clone();
            last = Some(turn);
        }
        (state, last.expect("no inputs"))
    }

    #[test]
    fn happy_path_commits_goal_set() {
        let (state, turn) = run(&["2000", "100", "200", "60"]);
        assert_eq!(state, None);
        assert_eq!(
            turn.commit,
            Some(GoalSet {
                calories: 2000,
                protein_g: 100,
                carbs_g: 200,
                fat_g: 60,
            })
        );
        assert!(matches!(turn.reply, Reply::Committed(_)));
    }

    #[test]
    fn non_positive_calories_reprompt() {
        let (state, turn) = run(&["0"]);
        assert_eq!(turn.reply, Reply::CaloriesMustBePositive);
        assert_eq!(state.unwrap().step, Step::Calories);

        let (state, turn) = run(&["-50"]);
        assert_eq!(turn.reply, Reply::CaloriesMustBePositive);
        assert_eq!(state.unwrap().step, Step::Calories);
    }

    #[test]
    fn i64_scale_values_reprompt_instead_of_overflowing() {
        // near i64::MAX / 4: the protein multiply would wrap without the cap
        let (state, turn) = run(&["2000", "4611686018427387904"]);
        assert_eq!(turn.reply, Reply::ValueTooLarge);
        let state = state.unwrap();
        assert_eq!(state.step, Step::Protein);
        assert_eq!(state.protein, None);

        let (state, turn) = run(&[&i64::MAX.to_string()]);
        assert_eq!(turn.reply, Reply::ValueTooLarge);
        let state = state.unwrap();
        assert_eq!(state.step, Step::Calories);
        assert_eq!(state.calories, None);
    }

    #[test]
    fn oversized_carbs_and_fat_values_cannot_reach_error_or_commit() {
        let (state, turn) = run(&["2000", "100", "9223372036854775807"]);
        assert_eq!(turn.reply, Reply::ValueTooLarge);
        let state = state.unwrap();
        assert_eq!(state.step, Step::Carbs);
        assert_eq!(state.carbs, None);

        let (state, turn) = run(&["2000", "100", "300", "9223372036854775807"]);
        assert_eq!(turn.reply, Reply::ValueTooLarge);
        assert_eq!(turn.commit, None);
        let state = state.unwrap();
        assert_eq!(state.step, Step::Fat);
        assert_eq!(state.fat, None);
    }

    #[test]
    fn non_numeric_input_reprompts_same_field() {
        let (state, turn) = run(&["2000", "lots"]);
        assert_eq!(turn.reply, Reply::NumbersOnly);
        let state = state.unwrap();
        assert_eq!(state.step, Step::Protein);
        assert_eq!(state.calories, Some(2000));
    }

    #[test]
    fn protein_over_budget_reprompts_without_storing() {
        let (state, turn) = run(&["1000", "300"]);
        assert_eq!(
            turn.reply,
            Reply::ProteinExceedsCalories {
                grams: 300,
                kcal: 1200,
                ceiling: 1000,
            }
        );
        let state = state.unwrap();
        assert_eq!(state.step, Step::Protein);
        assert_eq!(state.protein, None);
    }

    #[test]
    fn carbs_overflow_enters_error_and_retains_partials() {
        // 150g protein = 600, 200g carbs = 800, total 1400 > 1200
        let (state, turn) = run(&["1200", "150", "200"]);
        assert_eq!(
            turn.reply,
            Reply::Overflow {
                used: 1400,
                ceiling: 1200,
                excess: 200,
            }
        );
        let state = state.unwrap();
        assert_eq!(state.step, Step::Error);
        assert_eq!(state.protein, Some(150));
        assert_eq!(state.carbs, Some(200));
        assert_eq!(state.fat, None);
    }

    #[test]
    fn budget_invariant_holds_outside_error_state() {
        let (state, _) = run(&["2000", "100", "300"]);
        let state = state.unwrap();
        assert_eq!(state.step, Step::Fat);
        assert!(state.protein.unwrap() * 4 + state.carbs.unwrap() * 4 <= 2000);
    }

    #[test]
    fn fat_overflow_then_redo_fat_then_commit() {
        // 2000 kcal ceiling, protein 100 (400), carbs 300 (1200),
        // fat 50 (450) -> 2050, 50 over.
        let (state, turn) = run(&["2000", "100", "300", "50"]);
        assert_eq!(
            turn.reply,
            Reply::Overflow {
                used: 2050,
                ceiling: 2000,
                excess: 50,
            }
        );
        let state = state.unwrap();
        assert_eq!(state.step, Step::Error);

        // "2" redoes fat, since fat is the most recently set field.
        let turn = advance(state, "2");
        assert_eq!(turn.reply, Reply::AskFat);
        let state = turn.next.unwrap();
        assert_eq!(state.step, Step::Fat);

        // fat 40 -> 360 kcal, total 1960, fits.
        let turn = advance(state, "40");
        assert_eq!(
            turn.commit,
            Some(GoalSet {
                calories: 2000,
                protein_g: 100,
                carbs_g: 300,
                fat_g: 40,
            })
        );
        assert_eq!(turn.next, None);
    }

    #[test]
    fn recovery_one_restarts_clean() {
        let (state, _) = run(&["1200", "150", "200"]);
        let turn = advance(state.unwrap(), "1");
        assert_eq!(turn.reply, Reply::AskCalories);
        assert_eq!(turn.next, Some(DialogueState::start()));
    }

    #[test]
    fn recovery_two_targets_carbs_when_fat_unset() {
        let (state, _) = run(&["1200", "150", "200"]);
        let turn = advance(state.unwrap(), "2");
        assert_eq!(turn.reply, Reply::AskCarbs);
        let state = turn.next.unwrap();
        assert_eq!(state.step, Step::Carbs);
        // protein survives, the redone carbs value is overwritten on entry
        assert_eq!(state.protein, Some(150));
    }

    #[test]
    fn recovery_other_input_reprompts_choice() {
        let (state, _) = run(&["1200", "150", "200"]);
        let turn = advance(state.unwrap(), "maybe");
        assert_eq!(turn.reply, Reply::ChooseRecovery);
        assert_eq!(turn.next.unwrap().step, Step::Error);
    }

    #[test]
    fn redone_carbs_is_checked_against_already_set_fat() {
        // Reach error from the fat step, recover with "2" (targets fat),
        // overflow fat again, recover with "2" again - fat stays the target.
        // The check on re-entered values always sums every set field.
        let (state, _) = run(&["2000", "100", "300", "50"]);
        let turn = advance(state.unwrap(), "2");
        let turn = advance(turn.next.unwrap(), "60"); // 540 kcal, 2140 total
        assert_eq!(
            turn.reply,
            Reply::Overflow {
                used: 2140,
                ceiling: 2000,
                excess: 140,
            }
        );
        let turn = advance(turn.next.unwrap(), "2");
        assert_eq!(turn.reply, Reply::AskFat);
    }
}
