use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::filesystem::error::{AboveRootSnafu, PathNotFoundSnafu, TreeSnafu};
use crate::filesystem::{FilesystemError, VirtualFilesystem};
use crate::tree::{Named, NodeId};

const SEPARATOR: char = '/';
const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

impl VirtualFilesystem {
    /// Resolves `path` to the node it denotes.
    ///
    /// Absolute paths start at the root, everything else at the cursor. Empty
    /// and `.` segments are skipped, `..` climbs to the parent, any other
    /// segment is a glob matched against the children of the current node and
    /// the first match wins.
    pub fn resolve_path(&self, path: &str) -> Result<NodeId, FilesystemError> {
        let (mut node, relative, prefix) = match path.strip_prefix(SEPARATOR) {
            Some(rest) => (self.root, rest, "/"),
            None => (self.cursor, path, ""),
        };
        let segments: Vec<&str> = relative.split(SEPARATOR).collect();

        for (index, segment) in segments.iter().enumerate() {
            match *segment {
                "" | CURRENT_DIR => {}
                PARENT_DIR => {
                    node = self.tree.parent(node).context(AboveRootSnafu)?;
                }
                name => {
                    node = *self
                        .tree
                        .find(node, name)
                        .context(TreeSnafu)?
                        .first()
                        .context(PathNotFoundSnafu {
                            path: format!("{prefix}{}", segments[..=index].join("/")),
                        })?;
                }
            }
        }

        debug!("Resolved '{}' to '{}'", path, self.absolute_path(node));
        Ok(node)
    }

    /// Splits `path` into the node of its parent directory and the final name.
    pub(crate) fn resolve_parent<'p>(
        &self,
        path: &'p str,
    ) -> Result<(NodeId, &'p str), FilesystemError> {
        let trimmed = path.trim_end_matches(SEPARATOR);
        let (parent_path, name) = match trimmed.rsplit_once(SEPARATOR) {
            Some(("", name)) => ("/", name),
            Some((parent_path, name)) => (parent_path, name),
            None if path.starts_with(SEPARATOR) => ("/", trimmed),
            None => ("", trimmed),
        };

        Ok((self.resolve_path(parent_path)?, name))
    }

    /// `/`-joined names from the root down to `node`. The root itself is `/`,
    /// a node that is no longer part of the tree yields an empty string.
    pub fn absolute_path(&self, node: NodeId) -> String {
        let mut names: Vec<&str> = self
            .tree
            .ancestors(node)
            .into_iter()
            .filter_map(|id| self.tree.get(id).map(|entry| entry.name()))
            .collect();
        if names.is_empty() {
            return String::new();
        }
        if names.len() == 1 {
            return SEPARATOR.to_string();
        }

        names.reverse();
        names.join("/")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::filesystem::CatMode;

    /// /
    /// ├── home
    /// │   └── user
    /// │       └── notes.txt
    /// └── tmp
    fn sample() -> VirtualFilesystem {
        let mut fs = VirtualFilesystem::new();
        fs.mkdir("/home").unwrap();
        fs.mkdir("/home/user").unwrap();
        fs.mkdir("/tmp").unwrap();
        fs.cat(CatMode::Overwrite, "/home/user/notes.txt", "hi")
            .unwrap();
        fs
    }

    #[rstest]
    #[case("/", "/")]
    #[case("", "/home/user")]
    #[case(".", "/home/user")]
    #[case("./", "/home/user")]
    #[case("..", "/home")]
    #[case("../..", "/")]
    #[case("../../tmp", "/tmp")]
    #[case("notes.txt", "/home/user/notes.txt")]
    #[case("./notes.txt", "/home/user/notes.txt")]
    #[case("/home//user/", "/home/user")]
    #[case("/home/./user/../user", "/home/user")]
    #[case("*.txt", "/home/user/notes.txt")]
    #[case("/h*/u*", "/home/user")]
    fn resolves_relative_to_cursor(#[case] path: &str, #[case] expected: &str) {
        let mut fs = sample();
        fs.cd("/home/user").unwrap();
        let node = fs.resolve_path(path).unwrap();
        assert_eq!(fs.absolute_path(node), expected);
    }

    #[rstest]
    #[case("missing", "missing")]
    #[case("/home/nobody/file", "/home/nobody")]
    #[case("home/user/x", "home/user/x")]
    #[case("./home/./nope", "./home/./nope")]
    fn reports_partial_path_on_missing_segment(#[case] path: &str, #[case] partial: &str) {
        let fs = sample();
        let result = fs.resolve_path(path);
        match result {
            Err(FilesystemError::PathNotFoundError { path }) => assert_eq!(path, partial),
            other => panic!("Expected PathNotFoundError, got {other:?}"),
        }
    }

    #[test]
    fn climbing_above_root_fails() {
        let fs = sample();
        assert!(matches!(
            fs.resolve_path(".."),
            Err(FilesystemError::AboveRootError)
        ));
        assert!(matches!(
            fs.resolve_path("/home/../.."),
            Err(FilesystemError::AboveRootError)
        ));
    }

    #[test]
    fn descending_into_a_file_finds_nothing() {
        let fs = sample();
        assert!(matches!(
            fs.resolve_path("/home/user/notes.txt/inner"),
            Err(FilesystemError::PathNotFoundError { .. })
        ));
    }

    #[rstest]
    #[case("a", "/", "a")]
    #[case("/a", "/", "a")]
    #[case("/home/a", "/home", "a")]
    #[case("/home/a/", "/home", "a")]
    #[case("home/user/a", "/home/user", "a")]
    fn resolve_parent_splits_last_segment(
        #[case] path: &str,
        #[case] parent: &str,
        #[case] name: &str,
    ) {
        let fs = sample();
        let (node, last) = fs.resolve_parent(path).unwrap();
        assert_eq!(fs.absolute_path(node), parent);
        assert_eq!(last, name);
    }

    #[test]
    fn resolve_parent_of_root_yields_empty_name() {
        let fs = sample();
        let (node, name) = fs.resolve_parent("/").unwrap();
        assert_eq!(node, fs.root());
        assert_eq!(name, "");
    }

    #[test]
    fn absolute_path_round_trips_for_every_node() {
        let fs = sample();
        for level in fs.traverse() {
            for node in level {
                let path = fs.absolute_path(node);
                assert_eq!(fs.resolve_path(&path).unwrap(), node, "{path}");
            }
        }
    }

    #[test]
    fn absolute_path_of_removed_node_is_empty() {
        let mut fs = sample();
        let tmp = fs.resolve_path("/tmp").unwrap();
        fs.rmdir("/tmp").unwrap();
        assert_eq!(fs.absolute_path(tmp), "");
    }
}
