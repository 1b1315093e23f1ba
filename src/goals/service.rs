use tracing::{error, info};

use super::dialogue::{self, DialogueState, Reply};
use super::sessions::DialogueSessions;
use crate::store::NutritionStore;

/// Starts (or restarts) a goal-setting conversation for `user_id`.
pub async fn begin(sessions: &DialogueSessions, user_id: &str) -> Reply {
    let slot = sessions.slot(user_id);
    *slot.lock().await = Some(DialogueState::start());
    info!(%user_id, "goal setting started");
    Reply::AskCalories
}

/// Feeds one message into the user's conversation, if one is in progress.
/// Returns `None` when the user has no active session, so the caller can
/// route the message elsewhere.
///
/// The whole read-advance-write runs under the per-user slot lock; two
/// near-simultaneous messages from one sender cannot interleave. A finished
/// goal set is committed to the store before the session is cleared - if
/// the write fails the session stays as it was, and the user can retry.
pub async fn handle_input(
    store: &dyn NutritionStore,
    sessions: &DialogueSessions,
    user_id: &str,
    input: &str,
) -> Option<Reply> {
    let slot = sessions.peek(user_id)?;
    let mut guard = slot.lock().await;
    let current = guard.clone()?;

    let turn = dialogue::advance(current, input);

    if let Some(goals) = turn.commit {
        match store.set_goals(user_id, &goals).await {
            Ok(()) => {
                *guard = None;
                drop(guard);
                sessions.remove(user_id);
                info!(%user_id, calories = goals.calories, "goals committed");
                Some(turn.reply)
            }
            Err(e) => {
                error!(%user_id, error = %e, "goal commit failed, keeping session");
                Some(Reply::CommitFailed)
            }
        }
    } else {
        *guard = turn.next;
        Some(turn.reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use time::Date;
    use tokio::sync::Mutex;

    use super::*;
    use crate::meals::types::{GoalSet, MacroTotals, MealEvent};
    use crate::store::{StoreError, StoreResult};

    /// Goal-store stub whose writes can be made to fail on demand.
    #[derive(Default)]
    struct FlakyStore {
        fail_writes: AtomicBool,
        goals: Mutex<Option<GoalSet>>,
    }

    #[async_trait]
    impl NutritionStore for FlakyStore {
        async fn register_user(&self, _user_id: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn record_meal(&self, _event: &MealEvent) -> StoreResult<()> {
            Ok(())
        }

        async fn daily_totals(&self, _user_id: &str, _date: Date) -> StoreResult<MacroTotals> {
            Ok(MacroTotals::default())
        }

        async fn has_meals(&self, _user_id: &str, _date: Date) -> StoreResult<bool> {
            Ok(false)
        }

        async fn set_goals(&self, _user_id: &str, goals: &GoalSet) -> StoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Database(sqlx::Error::PoolClosed));
            }
            *self.goals.lock().await = Some(*goals);
            Ok(())
        }

        async fn get_goals(&self, _user_id: &str) -> StoreResult<Option<GoalSet>> {
            Ok(*self.goals.lock().await)
        }
    }

    async fn drive(store: &FlakyStore, sessions: &DialogueSessions, inputs: &[&str]) -> Reply {
        let mut last = None;
        for input in inputs {
            last = handle_input(store, sessions, "u1", input).await;
        }
        last.expect("no active session")
    }

    #[tokio::test]
    async fn no_session_returns_none() {
        let store = FlakyStore::default();
        let sessions = DialogueSessions::new();
        assert!(handle_input(&store, &sessions, "u1", "2000").await.is_none());
    }

    #[tokio::test]
    async fn full_conversation_commits_and_clears_session() {
        let store = FlakyStore::default();
        let sessions = DialogueSessions::new();
        begin(&sessions, "u1").await;

        let reply = drive(&store, &sessions, &["2000", "100", "200", "60"]).await;
        assert!(matches!(reply, Reply::Committed(_)));
        assert_eq!(
            store.get_goals("u1").await.unwrap(),
            Some(GoalSet {
                calories: 2000,
                protein_g: 100,
                carbs_g: 200,
                fat_g: 60,
            })
        );
        // session gone: the next message no longer routes to the dialogue
        assert!(handle_input(&store, &sessions, "u1", "5").await.is_none());
    }

    #[tokio::test]
    async fn commit_failure_preserves_session_for_retry() {
        let store = FlakyStore::default();
        let sessions = DialogueSessions::new();
        begin(&sessions, "u1").await;
        drive(&store, &sessions, &["2000", "100", "200"]).await;

        store.fail_writes.store(true, Ordering::SeqCst);
        let reply = drive(&store, &sessions, &["60"]).await;
        assert_eq!(reply, Reply::CommitFailed);
        assert_eq!(store.get_goals("u1").await.unwrap(), None);

        // store recovers; re-sending the fat value commits
        store.fail_writes.store(false, Ordering::SeqCst);
        let reply = drive(&store, &sessions, &["60"]).await;
        assert!(matches!(reply, Reply::Committed(_)));
        assert!(store.get_goals("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn restart_supersedes_in_flight_conversation() {
        let store = FlakyStore::default();
        let sessions = DialogueSessions::new();
        begin(&sessions, "u1").await;
        drive(&store, &sessions, &["2000", "100"]).await;

        begin(&sessions, "u1").await;
        // fresh conversation is back at the calories step
        let reply = drive(&store, &sessions, &["1800"]).await;
        assert_eq!(reply, Reply::AskProtein);
    }

    #[tokio::test]
    async fn users_do_not_share_sessions() {
        let store = FlakyStore::default();
        let sessions = DialogueSessions::new();
        begin(&sessions, "u1").await;
        assert!(handle_input(&store, &sessions, "u2", "2000").await.is_none());
    }
}
