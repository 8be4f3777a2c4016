//! # Text-mode streaming against LM Studio
//!
//! The history is flattened into a single `System: … / User: …` transcript
//! and sent to the `/completions` endpoint of an OpenAI-compatible server.
//! Fragments are printed as soon as they arrive.
//!
//! ```bash
//! # LM Studio's local server must be running on :1234 (the default),
//! # otherwise point OPENAI_BASE_URL somewhere else.
//! cargo run -p parley --example lmstudio_text_stream
//! ```
//!
//! ---------------------------------------------------------------------------

use std::io::{self, Write};

use futures_util::StreamExt;
use parley::{ChatClient, generic::Message, openai::OpenAiAdapterBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 1. One backend for the whole process.
    let backend = OpenAiAdapterBuilder::new_from_env()
        .with_temperature(0.7)
        .build()?;
    let client = ChatClient::new(backend);

    // 2. A short history; the new input is passed separately.
    let history = vec![
        Message::user("I am learning Rust."),
        Message::assistant("Great choice! What would you like to know?"),
    ];

    // 3. Stream the reply.
    let mut fragments = client.respond(&history, "Explain ownership in two sentences.");

    print!("Assistant: ");
    io::stdout().flush().ok();

    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                print!("{text}");
                io::stdout().flush().ok();
            }
            Err(e) => {
                eprintln!("\n\nError while streaming: {e}");
                break;
            }
        }
    }

    println!("\n\n[{} fragments, {:?}]", fragments.emitted(), fragments.state());
    Ok(())
}
