//! Request payloads handed to a backend for one turn.
//!
//! A backend accepts either free text (completion-style endpoints) or an
//! ordered list of `{role, content}` records (chat-style endpoints). The
//! payload is built fresh per turn and owned by the in-flight request only.
use serde::{Deserialize, Serialize};

use crate::generic::{Message, Role};

/// Which payload shape a backend should receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PromptMode {
    /// One flattened, role-prefixed text block.
    #[default]
    Text,
    /// Ordered `{role, content}` records.
    Structured,
}

/// One record of a [`RequestPayload::Structured`] payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub role: Role,
    pub content: String,
}

impl ChatRecord {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatRecord {
    fn from(value: &Message) -> Self {
        Self::new(value.role(), value.content())
    }
}

/// The input shape sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    Text(String),
    Structured(Vec<ChatRecord>),
}

impl RequestPayload {
    pub fn mode(&self) -> PromptMode {
        match self {
            RequestPayload::Text(_) => PromptMode::Text,
            RequestPayload::Structured(_) => PromptMode::Structured,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestPayload::Text(text) => Some(text),
            RequestPayload::Structured(_) => None,
        }
    }

    pub fn as_records(&self) -> Option<&[ChatRecord]> {
        match self {
            RequestPayload::Text(_) => None,
            RequestPayload::Structured(records) => Some(records),
        }
    }
}
