//! Line-oriented command surface over the virtual filesystem.
//!
//! Parses user input into filesystem calls, renders the returned nodes and
//! reports failures as messages.

mod render;
mod shell;
mod tokenizer;

pub use render::Renderer;
pub use shell::{Command, Outcome, Shell, ShellError};
pub use tokenizer::tokenize;
