use chrono::Local;

use crate::prompt::GREETING;
use crate::state::{ChatMessage, MessageId, Sender};

/// Ordered conversation log. Never empty: it is seeded with the greeting and
/// `reset` puts it back to exactly that one message.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_seq: u64,
}

impl Transcript {
    pub fn new() -> Self {
        let mut transcript = Self {
            messages: Vec::with_capacity(1),
            next_seq: 0,
        };
        transcript.seed();
        transcript
    }

    /// Build a message stamped with the current time and a fresh id.
    pub fn compose(&mut self, sender: Sender, content: impl Into<String>) -> ChatMessage {
        let timestamp = Local::now();
        let id = MessageId::new(&timestamp, sender, self.next_seq);
        self.next_seq += 1;
        ChatMessage {
            id,
            content: content.into(),
            sender,
            timestamp,
        }
    }

    /// Add to the end. Content is stored as given.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Compose and append in one step, returning a copy of what was stored.
    pub fn push(&mut self, sender: Sender, content: impl Into<String>) -> ChatMessage {
        let message = self.compose(sender, content);
        self.append(message.clone());
        message
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.seed();
    }

    fn seed(&mut self) {
        let greeting = self.compose(Sender::Bot, GREETING);
        self.messages.push(greeting);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
