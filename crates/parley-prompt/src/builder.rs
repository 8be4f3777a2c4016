//! Builder-style helper for flattening a conversation into a **transcript**.
//!
//! Completion-style backends take one block of text. `TranscriptBuilder`
//! writes one `Label: content` line per call and joins them with `\n`, with
//! no trailing newline:
//!
//! ```rust
//! use parley_prompt::builder::TranscriptBuilder;
//!
//! let text = TranscriptBuilder::new()
//!     .add_line("System", "You are a helpful assistant.")
//!     .add_line("User", "hi")
//!     .finalize();
//!
//! assert_eq!(text, "System: You are a helpful assistant.\nUser: hi");
//! ```
//!
//! The builder performs **no validation** and no smart formatting: content
//! containing newlines is written verbatim.
use std::fmt::Display;

/// Fluent helper to produce role-prefixed transcripts.
#[derive(Debug, Default, Clone)]
pub struct TranscriptBuilder {
    buffer: String,
    lines: usize,
}

impl TranscriptBuilder {
    /// Create a fresh, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `label: content` line.
    pub fn add_line(mut self, label: impl Display, content: impl Display) -> Self {
        self.separate();
        self.buffer.push_str(&format!("{label}: {content}"));
        self
    }

    /// `true` if no line has been written yet.
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    fn separate(&mut self) {
        if self.lines > 0 {
            self.buffer.push('\n');
        }
        self.lines += 1;
    }

    /// Retrieve the accumulated transcript and consume the builder.
    pub fn finalize(self) -> String {
        self.buffer
    }
}
