use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use super::dialogue::DialogueState;

type Slot = Arc<AsyncMutex<Option<DialogueState>>>;

/// In-process goal-setting sessions, one slot per sender. The outer map
/// lock is only held to look a slot up; each slot has its own async mutex,
/// so turns for one sender serialize while different senders never contend.
#[derive(Default)]
pub struct DialogueSessions {
    inner: Mutex<HashMap<String, Slot>>,
}

impl DialogueSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `user_id`, creating it if missing.
    pub fn slot(&self, user_id: &str) -> Slot {
        let mut map = self.inner.lock().expect("sessions lock poisoned");
        map.entry(user_id.to_string()).or_default().clone()
    }

    /// Existing slot, without creating one. `None` means the user has no
    /// conversation in progress (or never had one).
    pub fn peek(&self, user_id: &str) -> Option<Slot> {
        let map = self.inner.lock().expect("sessions lock poisoned");
        map.get(user_id).cloned()
    }

    /// Drops the slot after a conversation ends so the map does not grow
    /// with every sender the bot has ever talked to.
    pub fn remove(&self, user_id: &str) {
        let mut map = self.inner.lock().expect("sessions lock poisoned");
        map.remove(user_id);
    }
}
