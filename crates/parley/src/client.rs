//! Turn driver bound to a single long-lived backend.
//!
//! A [`ChatClient`] is built once at process start and passed to whatever
//! handles chat events. Each call to [`ChatClient::respond`] assembles the
//! payload for one turn, invokes the backend exactly once and hands back
//! the fragment stream.
use std::{env, sync::Arc};

use parley_core::{
    conversation::Conversation,
    generic::Message,
    payload::{PromptMode, RequestPayload},
    provider::StreamingCompletionProvider,
    sink::{DisplaySink, TurnFailure, drain_into},
    stream::{ExtractionRule, FragmentStream, stream},
};
use parley_prompt::Assembler;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";
pub const SYSTEM_PROMPT_ENV_VAR: &str = "PARLEY_SYSTEM_PROMPT";

/// A client bound to one backend.
///
/// Cloning is cheap: the backend sits behind an `Arc`.
pub struct ChatClient<B> {
    backend: Arc<B>,
    assembler: Assembler,
    system_instruction: String,
    mode: PromptMode,
    rule: ExtractionRule,
}

impl<B> Clone for ChatClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            assembler: self.assembler.clone(),
            system_instruction: self.system_instruction.clone(),
            mode: self.mode,
            rule: self.rule.clone(),
        }
    }
}

impl<B> ChatClient<B>
where
    B: StreamingCompletionProvider,
{
    /// Text mode, default assembler, default system instruction.
    pub fn new(backend: B) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    pub fn from_shared(backend: Arc<B>) -> Self {
        let mode = PromptMode::default();
        let rule = backend.extraction_rule(mode);

        Self {
            backend,
            assembler: Assembler::default(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_owned(),
            mode,
            rule,
        }
    }

    /// Switch the payload shape. The extraction rule is re-resolved from
    /// the backend.
    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.mode = mode;
        self.rule = self.backend.extraction_rule(mode);
        self
    }

    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Take the system instruction from `PARLEY_SYSTEM_PROMPT` when it is
    /// set and non-empty.
    pub fn with_system_instruction_from_env(self) -> Self {
        match env::var(SYSTEM_PROMPT_ENV_VAR) {
            Ok(instruction) if !instruction.trim().is_empty() => {
                self.with_system_instruction(instruction)
            }
            _ => self,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn extraction_rule(&self) -> &ExtractionRule {
        &self.rule
    }

    /// The payload [`Self::respond`] would send for this turn.
    pub fn payload(&self, history: &[Message], input: &str) -> RequestPayload {
        self.assembler
            .assemble(&self.system_instruction, history, input, self.mode)
    }

    /// Start a turn. `history` must not contain `input` yet.
    ///
    /// Nothing is sent until the returned stream is first polled; dropping
    /// it abandons the turn and closes the connection.
    pub fn respond<'s>(
        &'s self,
        history: &[Message],
        input: &str,
    ) -> FragmentStream<B::ElementStream<'s>> {
        let payload = self.payload(history, input);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            mode = ?self.mode,
            history = history.len(),
            "starting turn"
        );

        stream(self.backend.as_ref(), payload, self.rule.clone())
    }

    /// Run a whole turn against `conversation`, pushing fragments to
    /// `sink`.
    ///
    /// The user message is always recorded. The assistant reply is only
    /// recorded when the turn completed; a failed turn leaves its partial
    /// output in the returned [`TurnFailure`].
    pub async fn turn<D>(
        &self,
        conversation: &mut Conversation,
        input: &str,
        sink: D,
    ) -> Result<String, TurnFailure>
    where
        D: DisplaySink,
    {
        let result = drain_into(self.respond(conversation.messages(), input), sink).await;

        conversation.push_user(input);
        if let Ok(response) = &result {
            conversation.push_assistant(response.as_str());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use futures_util::{StreamExt, stream::Stream};
    use parley_core::{
        error::{ParleyError, Result},
        generic::Role,
        payload::ChatRecord,
        provider::BackendElement,
    };
    use serde_json::json;

    use super::*;

    type Script = Vec<Result<BackendElement>>;

    /// Replays a fixed script and remembers every payload it received.
    #[derive(Default)]
    struct ScriptedBackend {
        script: Mutex<Option<Script>>,
        calls: AtomicUsize,
        payloads: Mutex<Vec<RequestPayload>>,
    }

    impl ScriptedBackend {
        fn new(script: Script) -> Self {
            Self {
                script: Mutex::new(Some(script)),
                ..Self::default()
            }
        }
    }

    impl StreamingCompletionProvider for ScriptedBackend {
        type ElementStream<'s>
            = Pin<Box<dyn Stream<Item = Result<BackendElement>> + Send + 's>>
        where
            Self: 's;

        fn start_stream<'s>(&'s self, payload: RequestPayload) -> Self::ElementStream<'s> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads.lock().unwrap().push(payload);
            let script = self.script.lock().unwrap().take().unwrap_or_default();
            Box::pin(futures_util::stream::iter(script))
        }

        fn extraction_rule(&self, mode: PromptMode) -> ExtractionRule {
            match mode {
                PromptMode::Text => ExtractionRule::RawDelta,
                PromptMode::Structured => ExtractionRule::pointer("/message/content"),
            }
        }
    }

    fn deltas(parts: &[&str]) -> Script {
        parts
            .iter()
            .map(|p| Ok(BackendElement::Delta((*p).to_owned())))
            .collect()
    }

    #[tokio::test]
    async fn respond_sends_the_assembled_transcript_once() {
        let client = ChatClient::new(ScriptedBackend::new(deltas(&["I'm ", "", "fine"])));
        let history = vec![Message::user("hi")];

        let fragments: Vec<String> = client
            .respond(&history, "how are you")
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert_eq!(fragments, vec!["I'm ", "fine"]);
        assert_eq!(client.backend().calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            client.backend().payloads.lock().unwrap()[0],
            RequestPayload::Text(
                "System: You are a helpful assistant.\nUser: hi\nUser: how are you".into()
            )
        );
    }

    #[tokio::test]
    async fn structured_mode_resolves_the_pointer_rule() {
        let script = vec![
            Ok(BackendElement::Record(json!({"message": {"content": "a"}}))),
            Ok(BackendElement::Record(json!({"message": {}}))),
            Ok(BackendElement::Record(json!({"message": {"content": "b"}}))),
        ];
        let client = ChatClient::new(ScriptedBackend::new(script)).with_mode(PromptMode::Structured);
        assert_eq!(
            client.extraction_rule(),
            &ExtractionRule::pointer("/message/content")
        );

        let fragments: Vec<String> = client
            .respond(&[Message::user("hi")], "again")
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert_eq!(fragments, vec!["a", "b"]);
        assert_eq!(
            client.backend().payloads.lock().unwrap()[0],
            RequestPayload::Structured(vec![
                ChatRecord::new(Role::User, "hi"),
                ChatRecord::new(Role::User, "again"),
            ])
        );
    }

    #[tokio::test]
    async fn turn_records_both_sides_on_success() {
        let client = ChatClient::new(ScriptedBackend::new(deltas(&["Hel", "lo"])))
            .with_system_instruction("Be brief.");
        let mut conversation = Conversation::with_greeting("Hello, I am a bot. How can I help you?");
        let mut shown = Vec::new();

        let response = client.turn(&mut conversation, "hi", &mut shown).await.unwrap();

        assert_eq!(response, "Hello");
        assert_eq!(shown, vec!["Hel", "lo"]);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[1], Message::user("hi"));
        assert_eq!(conversation.messages()[2], Message::assistant("Hello"));
        assert_eq!(
            client.backend().payloads.lock().unwrap()[0].as_text(),
            Some("System: Be brief.\nUser: Hello, I am a bot. How can I help you?\nUser: hi")
        );
    }

    #[tokio::test]
    async fn failed_turn_keeps_partial_output_out_of_history() {
        let script = vec![
            Ok(BackendElement::Delta("part".into())),
            Err(ParleyError::Backend("connection reset".into())),
        ];
        let client = ChatClient::new(ScriptedBackend::new(script));
        let mut conversation = Conversation::new();

        let failure = client
            .turn(&mut conversation, "hi", String::new())
            .await
            .unwrap_err();

        assert_eq!(failure.partial, "part");
        assert!(matches!(failure.error, ParleyError::MidStream { emitted: 1, .. }));
        assert_eq!(conversation.messages(), &[Message::user("hi")]);
    }

    #[test]
    fn clones_share_the_backend() {
        let client = ChatClient::new(ScriptedBackend::default());
        let clone = client.clone();
        assert!(std::ptr::eq(client.backend(), clone.backend()));
        assert_eq!(clone.system_instruction(), DEFAULT_SYSTEM_INSTRUCTION);
        assert_eq!(clone.mode(), PromptMode::Text);
    }
}
