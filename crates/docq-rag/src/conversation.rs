//! Per-session conversation transcript.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use docq_core::{ChatMessage, Error, Result};

/// Append-only log of one session's question/answer turns.
///
/// Owned by exactly one user session and never shared across sessions. The
/// interior lock serializes appends within the session, and an exchange
/// (question plus optional answer) goes in under a single lock so two
/// in-flight questions cannot interleave their message pairs. The only way
/// to remove messages is a full [`clear`](Self::clear).
pub struct ConversationStore {
    session_id: String,
    messages: Mutex<Vec<ChatMessage>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append a single message to the transcript.
    pub fn append(&self, message: ChatMessage) -> Result<()> {
        self.lock()?.push(message);
        Ok(())
    }

    /// Append a user question and, when generation succeeded, the assistant
    /// answer, as one atomic exchange.
    ///
    /// Passing `None` for the answer records that the question was asked but
    /// produced no assistant message.
    pub fn append_exchange(&self, question: &str, answer: Option<&str>) -> Result<()> {
        let mut messages = self.lock()?;
        messages.push(ChatMessage::user(question));
        if let Some(answer) = answer {
            messages.push(ChatMessage::assistant(answer));
        }
        debug!(
            session_id = %self.session_id,
            messages = messages.len(),
            answered = answer.is_some(),
            "exchange appended"
        );
        Ok(())
    }

    /// Snapshot of the transcript in append order.
    pub fn all(&self) -> Result<Vec<ChatMessage>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Reset the transcript to empty.
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        debug!(session_id = %self.session_id, "conversation cleared");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ChatMessage>>> {
        self.messages
            .lock()
            .map_err(|e| Error::Session(format!("conversation lock error: {}", e)))
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docq_core::Role;

    #[test]
    fn messages_come_back_in_append_order() {
        let store = ConversationStore::new();
        store.append(ChatMessage::user("first")).unwrap();
        store.append(ChatMessage::assistant("second")).unwrap();

        let messages = store.all().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[test]
    fn clear_resets_to_empty() {
        let store = ConversationStore::new();
        store.append_exchange("question", Some("answer")).unwrap();
        assert_eq!(store.len().unwrap(), 2);

        store.clear().unwrap();
        assert!(store.all().unwrap().is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn answered_exchange_appends_a_user_assistant_pair() {
        let store = ConversationStore::new();
        store.append_exchange("what?", Some("that.")).unwrap();

        let messages = store.all().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "what?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "that.");
    }

    #[test]
    fn unanswered_exchange_appends_the_user_message_only() {
        let store = ConversationStore::new();
        store.append_exchange("what?", None).unwrap();

        let messages = store.all().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn each_store_gets_its_own_session_id() {
        let a = ConversationStore::new();
        let b = ConversationStore::new();
        assert_ne!(a.session_id(), b.session_id());
    }
}
