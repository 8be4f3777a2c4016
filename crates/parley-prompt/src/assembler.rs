//! The prompt assembler: `(system instruction, history, new input, mode)`
//! in, backend request payload out.
//!
//! ```rust
//! use parley_core::{generic::Message, payload::{PromptMode, RequestPayload}};
//! use parley_prompt::assemble;
//!
//! let history = vec![Message::user("hi")];
//! let payload = assemble("You are a helpful assistant.", &history, "how are you", PromptMode::Text);
//!
//! assert_eq!(
//!     payload,
//!     RequestPayload::Text(
//!         "System: You are a helpful assistant.\nUser: hi\nUser: how are you".into()
//!     )
//! );
//! ```
//!
//! Assembly is a pure function of its arguments: no timestamps, no
//! randomness, no truncation. Emptiness of the new input is not checked.
use parley_core::{
    generic::{Message, Role},
    payload::{ChatRecord, PromptMode, RequestPayload},
};

use crate::{builder::TranscriptBuilder, template::HistoryTemplate};

/// How history messages are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoleLabeling {
    /// Every history message is sent as a user turn, whatever its real role.
    /// This is what the existing chat pages expect.
    #[default]
    UserOnly,
    /// Every history message keeps its real role (`Assistant:` lines in
    /// text mode, `assistant` records in structured mode). Structured
    /// payloads also start with a `system` record for a non-empty system
    /// instruction.
    Preserve,
}

/// Configurable prompt assembler.
///
/// The default value reproduces the plain line-per-message rendering with
/// [`RoleLabeling::UserOnly`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembler {
    labeling: RoleLabeling,
    template: Option<HistoryTemplate>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labeling(mut self, labeling: RoleLabeling) -> Self {
        self.labeling = labeling;
        self
    }

    /// Render every turn through `template` instead of one line / record per
    /// message.
    pub fn with_template(mut self, template: HistoryTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn labeling(&self) -> RoleLabeling {
        self.labeling
    }

    pub fn template(&self) -> Option<&HistoryTemplate> {
        self.template.as_ref()
    }

    /// Build the payload for one turn.
    pub fn assemble(
        &self,
        system_instruction: &str,
        history: &[Message],
        new_input: &str,
        mode: PromptMode,
    ) -> RequestPayload {
        if let Some(template) = &self.template {
            let rendered = template.render(system_instruction, history, new_input);
            return match mode {
                PromptMode::Text => RequestPayload::Text(rendered),
                PromptMode::Structured => {
                    RequestPayload::Structured(vec![ChatRecord::new(Role::User, rendered)])
                }
            };
        }

        match mode {
            PromptMode::Text => {
                RequestPayload::Text(self.transcript(system_instruction, history, new_input))
            }
            PromptMode::Structured => {
                RequestPayload::Structured(self.records(system_instruction, history, new_input))
            }
        }
    }

    fn role_of(&self, message: &Message) -> Role {
        match self.labeling {
            RoleLabeling::UserOnly => Role::User,
            RoleLabeling::Preserve => message.role(),
        }
    }

    fn transcript(&self, system_instruction: &str, history: &[Message], new_input: &str) -> String {
        history
            .iter()
            .fold(
                TranscriptBuilder::new().add_line(Role::System.label(), system_instruction),
                |builder, message| builder.add_line(self.role_of(message).label(), message.content()),
            )
            .add_line(Role::User.label(), new_input)
            .finalize()
    }

    fn records(&self, system_instruction: &str, history: &[Message], new_input: &str) -> Vec<ChatRecord> {
        let mut records = Vec::with_capacity(history.len() + 2);

        if self.labeling == RoleLabeling::Preserve && !system_instruction.is_empty() {
            records.push(ChatRecord::new(Role::System, system_instruction));
        }

        records.extend(
            history
                .iter()
                .map(|message| ChatRecord::new(self.role_of(message), message.content())),
        );
        records.push(ChatRecord::new(Role::User, new_input));

        records
    }
}

/// Assemble a payload with the default [`Assembler`].
pub fn assemble(
    system_instruction: &str,
    history: &[Message],
    new_input: &str,
    mode: PromptMode,
) -> RequestPayload {
    Assembler::default().assemble(system_instruction, history, new_input, mode)
}
