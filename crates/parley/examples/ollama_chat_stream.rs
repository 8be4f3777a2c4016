//! # Structured streaming against Ollama
//!
//! The history is sent as a list of chat records to `/api/chat`; every
//! NDJSON line is a record and the text is read from `/message/content`.
//! The turn is drained into a `String` sink through [`drain_into`].
//!
//! ```bash
//! ollama pull llama3
//! OLLAMA_MODEL=llama3 cargo run -p parley --example ollama_chat_stream
//! ```

use parley::{
    Assembler, ChatClient, RoleLabeling,
    generic::Message,
    ollama::OllamaAdapterBuilder,
    payload::PromptMode,
    sink::drain_into,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let backend = OllamaAdapterBuilder::new_from_env().build()?;
    println!("Model: {}", backend.model());

    // Keep real roles so the model sees its own previous answers.
    let client = ChatClient::new(backend)
        .with_mode(PromptMode::Structured)
        .with_assembler(Assembler::new().with_labeling(RoleLabeling::Preserve))
        .with_system_instruction("You answer in one short paragraph.");

    let history = vec![
        Message::user("Name a systems programming language."),
        Message::assistant("Rust."),
    ];

    let mut shown = String::new();
    match drain_into(client.respond(&history, "Why is it memory safe?"), &mut shown).await {
        Ok(response) => println!("{response}"),
        Err(failure) => {
            eprintln!("turn failed: {}", failure.error);
            if !failure.partial.is_empty() {
                eprintln!("partial reply: {}", failure.partial);
            }
        }
    }

    Ok(())
}
