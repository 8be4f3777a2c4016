//! Generic message and role types shared by every crate in the workspace.
//!
//! They mirror the three roles exposed by chat-style model APIs: “system”,
//! “user” and “assistant”. Staying minimal and backend-agnostic means a
//! conversation can be rendered into a plain-text prompt *or* a structured
//! message list without the history knowing which backend will read it.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A single chat message.
///
/// Messages are immutable once created: fields are private and only exposed
/// through accessors, so a history handed to the prompt assembler can never
/// be altered behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Convenience constructor mirroring the field order used by common HTTP
    /// APIs (`role`, then `content`).
    ///
    /// ```rust
    /// use parley_core::generic::{Message, Role};
    ///
    /// let msg = Message::new(Role::User, "hi");
    /// assert_eq!(msg.content(), "hi");
    /// ```
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Chat roles recognised by the supported backends.
///
/// The `Display` implementation renders the canonical lowercase name, which
/// is also the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// “System” messages define global behaviour and style guidelines.
    System,
    /// Messages originating from the human user.
    User,
    /// Messages produced by the assistant / model.
    Assistant,
}

impl Role {
    /// Capitalised label used when a conversation is flattened into a
    /// transcript (`"System"`, `"User"`, `"Assistant"`).
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }

    #[test]
    fn role_display_and_label_differ_in_case() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::System.label(), "System");
        assert_eq!(Role::Assistant.label(), "Assistant");
    }
}
