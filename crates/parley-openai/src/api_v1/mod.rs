mod chat_completion;
mod common;
mod completion;

pub use chat_completion::*;
pub use common::Usage;
pub use completion::*;
