use std::path::PathBuf;

use crate::cli::{Cli, ColorChoice};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub script: Option<PathBuf>,
    pub seed: Option<PathBuf>,
    pub color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let color = match cli.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => supports_color::on(supports_color::Stream::Stdout).is_some(),
        };

        Self {
            script: cli.script,
            seed: cli.seed,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("always", true)]
    #[case("never", false)]
    fn explicit_color_choice_wins(#[case] choice: &str, #[case] expected: bool) {
        let cli = Cli::try_parse_from(["arborfs", "--color", choice]).unwrap();
        assert_eq!(RuntimeConfig::from(cli).color, expected);
    }

    #[test]
    fn carries_paths_over() {
        let cli = Cli::try_parse_from(["arborfs", "run.txt", "-s", "seed.yaml"]).unwrap();
        let config = RuntimeConfig::from(cli);
        assert_eq!(config.script, Some(PathBuf::from("run.txt")));
        assert_eq!(config.seed, Some(PathBuf::from("seed.yaml")));
    }
}
