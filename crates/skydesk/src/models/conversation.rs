use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::message::Message;

/// The ordered history of one chat, owned by whoever drives it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a user message unless the last message is already that exact user text.
    /// Returns whether a message was appended.
    pub fn push_user_once(&mut self, text: &str) -> bool {
        if self.last().is_some_and(|last| last.is_user_text(text)) {
            return false;
        }
        self.push(Message::user().with_text(text));
        true
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Ids of tool requests that have no later tool response.
    /// An empty result means the conversation can be sent to the completion endpoint as is.
    pub fn unanswered_requests(&self) -> Vec<String> {
        let mut pending: Vec<String> = Vec::new();
        let mut answered: HashSet<&str> = HashSet::new();

        for message in self.messages.iter().rev() {
            for response in message.tool_responses() {
                answered.insert(response.id.as_str());
            }
            for request in message.tool_requests() {
                if !answered.contains(request.id.as_str()) {
                    pending.push(request.id.clone());
                }
            }
        }

        pending.reverse();
        pending
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::ToolResult;
    use serde_json::json;

    #[test]
    fn test_push_user_once_is_idempotent() {
        let mut conversation = Conversation::new();
        assert!(conversation.push_user_once("Check flight DL456"));
        assert!(!conversation.push_user_once("Check flight DL456"));
        assert_eq!(conversation.len(), 1);

        conversation.push(Message::assistant().with_text("It is on time."));
        assert!(conversation.push_user_once("Check flight DL456"));
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_unanswered_requests() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user().with_text("Two things please"));
        conversation.push(
            Message::assistant()
                .with_tool_request("a", "check_flight_status", json!({"flight_number": "AA1"}))
                .with_tool_request("b", "track_baggage", json!({"baggage_tag": "T1"})),
        );
        assert_eq!(conversation.unanswered_requests(), vec!["a", "b"]);

        let result = ToolResult::new(json!({"ok": true}));
        conversation.push(Message::tool().with_tool_response("a", &result));
        assert_eq!(conversation.unanswered_requests(), vec!["b"]);

        conversation.push(Message::tool().with_tool_response("b", &result));
        assert!(conversation.unanswered_requests().is_empty());
    }
}
