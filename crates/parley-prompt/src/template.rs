//! Single-prompt templates that embed the whole chat history.
//!
//! Some chat front-ends do not send the history as separate messages at all.
//! They render one instruction that *contains* the history and the new
//! question, e.g.
//!
//! ```text
//! You are a helpful assistant. Use the chat history if it helps, otherwise ignore it:
//!
//! Chat history: User: hi
//! Assistant: hello
//!
//! User response: how are you
//! ```
//!
//! [`HistoryTemplate`] supports three placeholders:
//!
//! | Placeholder            | Replaced with                                   |
//! |------------------------|-------------------------------------------------|
//! | `{system_instruction}` | the system instruction of the turn              |
//! | `{chat_history}`       | the history as a role-labelled transcript       |
//! | `{user_question}`      | the new user input                              |
//!
//! Anything else in braces is copied verbatim. Substituted values are never
//! scanned for placeholders again.
use std::borrow::Cow;

use parley_core::generic::Message;

use crate::builder::TranscriptBuilder;

/// The template used by [`HistoryTemplate::default`].
pub const DEFAULT_HISTORY_TEMPLATE: &str = "You are a helpful assistant. Use the chat history if it helps, otherwise ignore it:\n\nChat history: {chat_history}\n\nUser response: {user_question}";

const SYSTEM_INSTRUCTION: &str = "{system_instruction}";
const CHAT_HISTORY: &str = "{chat_history}";
const USER_QUESTION: &str = "{user_question}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTemplate {
    template: Cow<'static, str>,
}

impl Default for HistoryTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_TEMPLATE)
    }
}

impl HistoryTemplate {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render the template for one turn.
    ///
    /// History lines always carry the message's real role label, since the
    /// model has to tell its own earlier answers apart from the user's.
    pub fn render(&self, system_instruction: &str, history: &[Message], user_question: &str) -> String {
        let chat_history = history
            .iter()
            .fold(TranscriptBuilder::new(), |builder, message| {
                builder.add_line(message.role().label(), message.content())
            })
            .finalize();

        let mut rendered = String::with_capacity(self.template.len() + chat_history.len());
        let mut rest = self.template.as_ref();

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let candidate = &rest[open..];

            let (value, consumed) = if candidate.starts_with(SYSTEM_INSTRUCTION) {
                (system_instruction, SYSTEM_INSTRUCTION.len())
            } else if candidate.starts_with(CHAT_HISTORY) {
                (chat_history.as_str(), CHAT_HISTORY.len())
            } else if candidate.starts_with(USER_QUESTION) {
                (user_question, USER_QUESTION.len())
            } else {
                ("{", 1)
            };

            rendered.push_str(value);
            rest = &candidate[consumed..];
        }
        rendered.push_str(rest);

        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_embeds_history_and_question() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let rendered = HistoryTemplate::default().render("ignored", &history, "how are you");

        assert_eq!(
            rendered,
            "You are a helpful assistant. Use the chat history if it helps, otherwise ignore it:\n\n\
             Chat history: User: hi\nAssistant: hello\n\n\
             User response: how are you"
        );
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let template = HistoryTemplate::new("{system_instruction}|{user_question}|{other}");
        let rendered = template.render("sys {user_question}", &[], "q {chat_history}");

        assert_eq!(rendered, "sys {user_question}|q {chat_history}|{other}");
    }

    #[test]
    fn unbalanced_braces_are_copied() {
        let template = HistoryTemplate::new("{ {user_question");
        assert_eq!(template.render("", &[], "x"), "{ {user_question");
    }
}
