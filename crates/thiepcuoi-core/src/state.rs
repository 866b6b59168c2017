//! UI-agnostic conversation state types
//!
//! These are shared by every front-end binding and never depend on a specific
//! UI framework.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who wrote a message. The transcript only ever holds these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Identifier built from creation time, sender and a per-transcript sequence
/// number, so two messages from the same sender in the same millisecond differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub(crate) fn new(created: &DateTime<Local>, sender: Sender, seq: u64) -> Self {
        Self(format!(
            "{}-{}-{}",
            created.timestamp_millis(),
            sender.as_str(),
            seq
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    /// Display time, e.g. `14:05`
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Point-in-time copy of everything a view needs to draw the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSnapshot {
    pub messages: Vec<ChatMessage>,
    pub pending_input: String,
    pub busy: bool,
}
