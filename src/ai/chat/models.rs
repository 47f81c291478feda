//! The core models for keeping a conversation with the booking agent.
use std::fmt;

use crate::openai::{Message, Role};

const SUMMARY_TURNS: usize = 6;
const SUMMARY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TurnRole::User => f.write_str("User"),
            TurnRole::Assistant => f.write_str("Assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: &str) -> Self {
        Self {
            role: TurnRole::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.to_string(),
        }
    }

    fn to_message(&self) -> Message {
        let role = match self.role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        };
        Message::new(role, &self.content)
    }

    fn preview(&self) -> String {
        if self.content.chars().count() > SUMMARY_PREVIEW_CHARS {
            let head: String = self.content.chars().take(SUMMARY_PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.content.clone()
        }
    }
}

/// Append-only record of a conversation. Only `clear` removes turns.
#[derive(Debug, Default, Clone)]
pub struct ConversationMemory(Vec<Turn>);

impl ConversationMemory {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a completed exchange.
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.0.push(Turn::user(user));
        self.0.push(Turn::assistant(assistant));
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    /// The conversation so far as chat completion messages.
    pub fn messages(&self) -> Vec<Message> {
        self.0.iter().map(Turn::to_message).collect()
    }

    /// The last few turns, each cut to a short preview.
    pub fn summary(&self) -> String {
        if self.0.is_empty() {
            return String::from("No conversation history");
        }

        let mut out = format!("Conversation History ({} messages):\n", self.0.len());
        let skip = self.0.len().saturating_sub(SUMMARY_TURNS);
        for (i, turn) in self.0.iter().skip(skip).enumerate() {
            out.push_str(&format!("{}. {}: {}\n", i + 1, turn.role, turn.preview()));
        }
        out.trim_end().to_string()
    }
}
