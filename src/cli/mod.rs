mod cli;

pub use cli::{Cli, ColorChoice};
