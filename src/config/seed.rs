use std::borrow::Cow;
use std::path::Path;

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::{CatMode, FilesystemError, VirtualFilesystem};

/// Initial layout of a filesystem, read from YAML.
///
/// ```yaml
/// cwd: /home/user
/// tree:
///   home:
///     user:
///       notes.txt: "hello"
///       empty.txt: ~
///       projects: {}
/// ```
///
/// Mappings become directories, strings become files with that content and
/// null becomes an empty file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Seed {
    cwd: Option<String>,
    entries: Vec<SeedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedEntry {
    Directory {
        name: String,
        children: Vec<SeedEntry>,
    },
    File {
        name: String,
        contents: String,
    },
}

impl Seed {
    pub async fn read(path: &Path) -> Result<Self, SeedError> {
        debug!("Reading seed file: {}", path.display());
        let bytes = compio::fs::read(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read seed file: {} bytes", contents.len());

        contents.as_str().try_into()
    }

    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    pub fn entries(&self) -> &[SeedEntry] {
        &self.entries
    }

    /// Builds a fresh filesystem holding the seeded layout.
    pub fn build(&self) -> Result<VirtualFilesystem, SeedError> {
        let mut filesystem = VirtualFilesystem::new();
        self.apply(&mut filesystem)?;
        Ok(filesystem)
    }

    /// Creates every seeded entry below the root of `filesystem`, then moves
    /// the cursor to the configured working directory.
    pub fn apply(&self, filesystem: &mut VirtualFilesystem) -> Result<(), SeedError> {
        for entry in &self.entries {
            Self::apply_entry(filesystem, "", entry).context(ApplySnafu)?;
        }
        if let Some(cwd) = &self.cwd {
            filesystem.cd(cwd).context(ApplySnafu)?;
        }
        Ok(())
    }

    fn apply_entry(
        filesystem: &mut VirtualFilesystem,
        parent: &str,
        entry: &SeedEntry,
    ) -> Result<(), FilesystemError> {
        match entry {
            SeedEntry::Directory { name, children } => {
                let path = format!("{parent}/{name}");
                filesystem.mkdir(&path)?;
                for child in children {
                    Self::apply_entry(filesystem, &path, child)?;
                }
            }
            SeedEntry::File { name, contents } => {
                filesystem.cat(CatMode::Overwrite, &format!("{parent}/{name}"), contents)?;
            }
        }
        Ok(())
    }

    fn parse_entries(mapping: &LinkedHashMap<Yaml, Yaml>) -> Result<Vec<SeedEntry>, SeedError> {
        mapping
            .iter()
            .map(|(key, value)| {
                let name = match key {
                    Yaml::Value(Scalar::String(name)) => name.to_string(),
                    _ => {
                        return InvalidEntrySnafu {
                            name: format!("{key:?}"),
                        }
                        .fail();
                    }
                };

                match value {
                    Yaml::Mapping(children) => Ok(SeedEntry::Directory {
                        children: Self::parse_entries(children)?,
                        name,
                    }),
                    Yaml::Value(Scalar::String(contents)) => Ok(SeedEntry::File {
                        contents: contents.to_string(),
                        name,
                    }),
                    Yaml::Value(Scalar::Null) => Ok(SeedEntry::File {
                        contents: String::new(),
                        name,
                    }),
                    _ => InvalidEntrySnafu { name }.fail(),
                }
            })
            .collect()
    }
}

impl TryFrom<&str> for Seed {
    type Error = SeedError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedSeedSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let cwd = match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed("cwd")))) {
            None | Some(Yaml::Value(Scalar::Null)) => None,
            Some(value) => Some(value.as_str().context(CwdNotStringSnafu)?.to_string()),
        };

        let entries = match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed("tree")))) {
            None | Some(Yaml::Value(Scalar::Null)) => Vec::new(),
            Some(tree) => Self::parse_entries(tree.as_mapping().context(TreeNotMapSnafu)?)?,
        };

        Ok(Seed { cwd, entries })
    }
}

#[derive(Debug, Snafu)]
pub enum SeedError {
    #[snafu(display("Failed to read the seed file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Seed file is not valid UTF-8: {}", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the seed file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted seed file"))]
    MalformedSeed,
    #[snafu(display("Top level of the seed should be a map"))]
    TopLevelNotMap,
    #[snafu(display("The 'cwd' entry should be a string"))]
    CwdNotString,
    #[snafu(display("The 'tree' section should be a map"))]
    TreeNotMap,
    #[snafu(display("Seed entry '{}' should be a map, a string or null", name))]
    InvalidEntryError { name: String },
    #[snafu(display("Failed to build the seeded filesystem"))]
    ApplyError { source: FilesystemError },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    const SAMPLE: &str = r#"
cwd: /home/user
tree:
  home:
    user:
      notes.txt: "hello"
      empty.txt: ~
      projects: {}
  readme.md: "top level"
"#;

    fn read(fs: &mut VirtualFilesystem, path: &str) -> String {
        fs.cat(CatMode::Read, path, "").unwrap().unwrap()
    }

    #[test]
    fn parses_nested_layout_in_order() {
        let seed: Seed = SAMPLE.try_into().unwrap();
        assert_eq!(seed.cwd(), Some("/home/user"));
        assert_eq!(
            seed.entries(),
            &[
                SeedEntry::Directory {
                    name: "home".into(),
                    children: vec![SeedEntry::Directory {
                        name: "user".into(),
                        children: vec![
                            SeedEntry::File {
                                name: "notes.txt".into(),
                                contents: "hello".into()
                            },
                            SeedEntry::File {
                                name: "empty.txt".into(),
                                contents: String::new()
                            },
                            SeedEntry::Directory {
                                name: "projects".into(),
                                children: Vec::new()
                            },
                        ],
                    }],
                },
                SeedEntry::File {
                    name: "readme.md".into(),
                    contents: "top level".into()
                },
            ]
        );
    }

    #[test]
    fn builds_filesystem_and_moves_cursor() {
        let seed: Seed = SAMPLE.try_into().unwrap();
        let mut fs = seed.build().unwrap();
        assert_eq!(fs.pwd(), "/home/user");
        assert_eq!(read(&mut fs, "notes.txt"), "hello");
        assert_eq!(read(&mut fs, "empty.txt"), "");
        assert_eq!(read(&mut fs, "/readme.md"), "top level");
        assert!(fs.entry(fs.resolve_path("projects").unwrap()).unwrap().is_dir());
    }

    #[test]
    fn missing_sections_give_empty_seed() {
        let seed: Seed = "other: value".try_into().unwrap();
        assert_eq!(seed, Seed::default());
        let fs = seed.build().unwrap();
        assert_eq!(fs.tree().len(), 1);
    }

    #[rstest]
    #[case("", "MalformedSeed")]
    #[case("- a\n- b", "TopLevelNotMap")]
    #[case("just a string", "TopLevelNotMap")]
    #[case("tree:\n  - a", "TreeNotMap")]
    #[case("cwd: [a]", "CwdNotString")]
    #[case("tree:\n  count: 3", "InvalidEntryError")]
    #[case("tree:\n  list: [a, b]", "InvalidEntryError")]
    #[case("invalid: yaml: content: [unclosed", "ParseError")]
    fn rejects_malformed_seeds(#[case] contents: &str, #[case] expected: &str) {
        let error = Seed::try_from(contents).unwrap_err();
        assert!(
            format!("{error:?}").starts_with(expected),
            "expected {expected}, got {error:?}"
        );
    }

    #[test]
    fn unknown_cwd_fails_to_apply() {
        let seed: Seed = "cwd: /nowhere\ntree: {}".try_into().unwrap();
        assert!(matches!(
            seed.build(),
            Err(SeedError::ApplyError {
                source: FilesystemError::PathNotFoundError { .. }
            })
        ));
    }

    #[compio::test]
    async fn reads_seed_from_disk() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{SAMPLE}").expect("Failed to write to temp file");

        let seed = Seed::read(file.path()).await.unwrap();
        assert_eq!(seed.cwd(), Some("/home/user"));
        assert_eq!(seed.entries().len(), 2);
    }

    #[compio::test]
    async fn missing_seed_file_is_a_read_error() {
        let result = Seed::read(Path::new("nonexistent-seed.yaml")).await;
        assert!(matches!(result, Err(SeedError::ReadError { .. })));
    }
}
