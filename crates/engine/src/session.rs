//! Caller-owned conversation sessions.

use crate::escalation::EscalationTracker;
use crate::memory::ConversationMemory;
use chrono::{DateTime, Utc};
use lexguide_core::config::EngineSettings;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Memory and escalation state for one conversation.
///
/// Both live behind a single lock so an answer cycle sees and updates them
/// together. Concurrent questions on the same session run one at a time.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    pub(crate) state: Mutex<SessionState>,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub memory: ConversationMemory,
    pub tracker: EscalationTracker,
}

impl Session {
    pub fn new(settings: &EngineSettings) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!("Created session {}", id);
        Self {
            id,
            created_at: Utc::now(),
            state: Mutex::new(SessionState {
                memory: ConversationMemory::new(settings.memory_capacity),
                tracker: EscalationTracker::new(settings.max_attempts, settings.tracker_capacity),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl SessionState {
    /// Clear memory and escalation state together.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.tracker.clear();
    }
}
