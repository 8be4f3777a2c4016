//! # Console chat
//!
//! A small REPL around [`ChatClient::turn`]. The backend is picked by
//! `PARLEY_BACKEND` (`openai` or `ollama`), the prompt is rendered through
//! the default [`HistoryTemplate`] and the conversation starts with the
//! bot's greeting. A `.env` file in the working directory is honoured.
//!
//! ```bash
//! PARLEY_BACKEND=ollama RUST_LOG=parley=debug \
//!     cargo run -p parley --features tracing --example console_chat
//! ```
//!
//! Type `/quit` (or send EOF) to leave.

use std::io::{self, BufRead, Write};

use parley::{
    Assembler, Backend, ChatClient, HistoryTemplate, conversation::Conversation, sink::DisplaySink,
};
use tracing_subscriber::EnvFilter;

const GREETING: &str = "Hello, I am a bot. How can I help you?";

/// Prints fragments straight to the terminal.
struct Stdout;

impl DisplaySink for Stdout {
    fn push(&mut self, fragment: &str) {
        print!("{fragment}");
        io::stdout().flush().ok();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let backend = Backend::from_env()?;
    println!("[{} · {}]", backend.name(), backend.model());

    let client = ChatClient::new(backend)
        .with_assembler(Assembler::new().with_template(HistoryTemplate::default()))
        .with_system_instruction_from_env();

    let mut conversation = Conversation::with_greeting(GREETING);
    println!("AI: {GREETING}");

    let stdin = io::stdin();
    loop {
        print!("\nHuman: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }

        print!("AI: ");
        io::stdout().flush()?;

        if let Err(failure) = client.turn(&mut conversation, input, Stdout).await {
            eprintln!("\n[error] {}", failure.error);
        }
        println!();
    }

    Ok(())
}
