use regex::Regex;
use snafu::{ResultExt, Snafu};

const WILDCARD: char = '*';

/// A glob-style name matcher where `*` stands for any run of characters.
///
/// Patterns without a wildcard are compared literally, everything else is
/// compiled into an anchored regular expression.
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Glob(Regex),
}

impl Pattern {
    pub fn new(glob: &str) -> Result<Self, PatternError> {
        if !glob.contains(WILDCARD) {
            return Ok(Pattern::Exact(glob.to_string()));
        }

        let body = glob
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$")).context(PatternSnafu {
            pattern: glob.to_string(),
        })?;

        Ok(Pattern::Glob(regex))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(expected) => expected == name,
            Pattern::Glob(regex) => regex.is_match(name),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Cannot compile name pattern '{}'", pattern))]
pub struct PatternError {
    pub pattern: String,
    source: regex::Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("file.txt", "file.txt", true)]
    #[case("file.txt", "fileXtxt", false)]
    #[case("*.txt", "notes.txt", true)]
    #[case("*.txt", "notes.txt.bak", false)]
    #[case("no*s", "notes", true)]
    #[case("*", "", true)]
    #[case("*", "anything at all", true)]
    #[case("a*b*c", "abc", true)]
    #[case("a*b*c", "aXXbYYc", true)]
    #[case("a*b*c", "acb", false)]
    #[case("[x]*", "[x]y", true)]
    #[case("(a|b)*", "a", false)]
    #[case("", "", true)]
    fn pattern_matching(#[case] glob: &str, #[case] name: &str, #[case] expected: bool) {
        let pattern = Pattern::new(glob).expect("pattern should compile");
        assert_eq!(pattern.matches(name), expected, "{glob} vs {name}");
    }

    #[test]
    fn pattern_without_wildcard_is_literal() {
        let pattern = Pattern::new("a.b").unwrap();
        assert!(matches!(pattern, Pattern::Exact(_)));
        assert!(!pattern.matches("aXb"));
    }

    #[test]
    fn wildcard_is_anchored_at_both_ends() {
        let pattern = Pattern::new("*.rs").unwrap();
        assert!(pattern.matches("main.rs"));
        assert!(!pattern.matches("main.rs~"));
        assert!(!pattern.matches("main.rsx"));
    }
}
