use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::application::data::LogLevel;

/// Interactive shell over an in-memory filesystem.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// File of commands to run instead of reading from stdin
    pub script: Option<PathBuf>,

    /// YAML file describing the initial tree
    #[clap(long, short)]
    pub seed: Option<PathBuf>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}
