use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::conversation::Conversation;

/// One user's chat: its conversation plus the id the validation service threads on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub conversation: Conversation,
    pub created_at: DateTime<Utc>,
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(new_id())
    }

    pub fn with_id<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            conversation: Conversation::new(),
            created_at: Utc::now(),
        }
    }

    /// Start over with an empty conversation under a fresh id
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;

    #[test]
    fn test_ids_are_simple_uuids() {
        let session = Session::new();
        assert_eq!(session.id.len(), 32);
        assert!(session.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(session.id, Session::new().id);
    }

    #[test]
    fn test_reset_clears_history_and_id() {
        let mut session = Session::with_id("thread-1");
        session.conversation.push(Message::user().with_text("Hi"));

        session.reset();

        assert!(session.conversation.is_empty());
        assert_ne!(session.id, "thread-1");
    }
}
