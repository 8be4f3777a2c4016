//! Caller-side session history.
//!
//! The prompt assembler and the fragment stream only ever *read* a history
//! slice. `Conversation` is the object a chat session keeps for its whole
//! lifetime: it records the user's message and, once a turn has finished,
//! the assistant's full reply.
use crate::generic::Message;

/// Ordered chat history owned by one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with an assistant greeting already shown to the
    /// user.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Record a finished assistant reply (usually the concatenation of all
    /// fragments of the turn).
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::Role;

    #[test]
    fn greeting_seeds_an_assistant_message() {
        let conversation = Conversation::with_greeting("Hello, I am a bot. How can I help you?");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role(), Role::Assistant);
    }

    #[test]
    fn turns_are_recorded_in_order() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");
        conversation.push_assistant("hello");

        let roles: Vec<Role> = conversation.iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(conversation.last().map(Message::content), Some("hello"));
    }
}
