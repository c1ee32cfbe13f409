use std::str::FromStr;

use derive_more::{Display, From};
use snafu::{OptionExt, ResultExt, ensure};
use tracing::{debug, info};

use crate::filesystem::error::{
    FileNotFoundSnafu, InvalidCatModeSnafu, InvalidNameSnafu, MissingArgumentSnafu,
    MoveIntoSelfSnafu, NameTakenSnafu, NotADirectorySnafu, NotAFileSnafu, RootCopySnafu,
    RootDeletionSnafu, RootMoveSnafu, RootRenameSnafu, TreeSnafu,
};
use crate::filesystem::{Entry, FileData, FilesystemError};
use crate::tree::{Named, NodeId, Target, Tree, TreeError};

/// How `cat` treats the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CatMode {
    #[display("")]
    Read,
    #[display(">")]
    Overwrite,
    #[display(">>")]
    Append,
}

impl FromStr for CatMode {
    type Err = FilesystemError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "" => Ok(CatMode::Read),
            ">" => Ok(CatMode::Overwrite),
            ">>" => Ok(CatMode::Append),
            _ => InvalidCatModeSnafu { mode }.fail(),
        }
    }
}

/// A path to resolve, or a node that was already resolved.
#[derive(Debug, Clone, Copy, From)]
pub enum Location<'a> {
    Path(&'a str),
    Node(NodeId),
}

/// In-memory filesystem with a current directory.
///
/// Every command resolves its path arguments first and only mutates the tree
/// once all checks passed, so a failed command leaves the tree untouched.
/// The cursor always points at a live directory.
#[derive(Debug, Clone)]
pub struct VirtualFilesystem {
    pub(super) tree: Tree<Entry>,
    pub(super) root: NodeId,
    pub(super) cursor: NodeId,
}

impl Default for VirtualFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFilesystem {
    pub fn new() -> Self {
        let (tree, root) = Tree::with_root(Entry::directory(""));
        Self {
            tree,
            root,
            cursor: root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn tree(&self) -> &Tree<Entry> {
        &self.tree
    }

    pub fn entry(&self, node: NodeId) -> Option<&Entry> {
        self.tree.get(node)
    }

    pub fn traverse(&self) -> Vec<Vec<NodeId>> {
        self.tree.traverse()
    }

    /// Absolute path of the current directory.
    pub fn pwd(&self) -> String {
        self.absolute_path(self.cursor)
    }

    /// Creates a directory named by the last segment of `path`.
    pub fn mkdir(&mut self, path: &str) -> Result<NodeId, FilesystemError> {
        require(path, "path")?;
        let (parent, name) = self.resolve_parent(path)?;
        validate_name(name)?;
        self.ensure_directory(parent, path)?;
        self.ensure_name_free(parent, name)?;

        let node = self
            .tree
            .insert(Entry::directory(name), Some(Target::Node(parent)))
            .context(TreeSnafu)?;
        debug!("Created directory '{}'", self.absolute_path(node));
        Ok(node)
    }

    /// Deletes a directory and everything below it.
    ///
    /// A cursor inside the deleted subtree moves to the directory's former parent.
    pub fn rmdir(&mut self, path: &str) -> Result<(), FilesystemError> {
        require(path, "path")?;
        let node = self.resolve_path(path)?;
        ensure!(node != self.root, RootDeletionSnafu);
        self.ensure_directory(node, path)?;

        let parent = self.tree.parent(node);
        let cursor_inside = self.tree.is_ancestor_of(node, self.cursor);
        let absolute = self.absolute_path(node);
        self.tree.delete(Target::Node(node)).context(TreeSnafu)?;
        debug!("Removed directory '{}'", absolute);

        if cursor_inside {
            if let Some(parent) = parent {
                self.cursor = parent;
                info!(
                    "Working directory was removed, moved to '{}'",
                    self.absolute_path(parent)
                );
            }
        }
        Ok(())
    }

    /// Moves the cursor to the directory denoted by `path`.
    pub fn cd(&mut self, path: &str) -> Result<NodeId, FilesystemError> {
        require(path, "path")?;
        let node = self.resolve_path(path)?;
        self.ensure_directory(node, path)?;

        self.cursor = node;
        debug!("Changed directory to '{}'", self.absolute_path(node));
        Ok(node)
    }

    /// Reads, overwrites or appends to the file at `path`.
    ///
    /// Writes create the file when it does not exist yet. Reads return the
    /// contents, writes return `None`.
    pub fn cat(
        &mut self,
        mode: CatMode,
        path: &str,
        contents: &str,
    ) -> Result<Option<String>, FilesystemError> {
        require(path, "path")?;
        let (parent, name) = self.resolve_parent(path)?;
        let existing = self
            .tree
            .find(parent, name)
            .context(TreeSnafu)?
            .first()
            .copied();

        if let Some(node) = existing {
            self.ensure_file(node, path)?;
        }

        let node = match (mode, existing) {
            (CatMode::Read, Some(node)) => {
                let data = self.file_data(node, path)?;
                return Ok(Some(data.contents().to_string()));
            }
            (CatMode::Read, None) => return FileNotFoundSnafu { path }.fail(),
            (_, Some(node)) => node,
            (_, None) => {
                validate_name(name)?;
                self.ensure_directory(parent, path)?;
                let node = self
                    .tree
                    .insert(Entry::file(name, ""), Some(Target::Node(parent)))
                    .context(TreeSnafu)?;
                debug!("Created file '{}'", self.absolute_path(node));
                node
            }
        };

        let data = self
            .tree
            .get_mut(node)
            .and_then(Entry::file_data_mut)
            .context(NotAFileSnafu { path })?;
        match mode {
            CatMode::Append => data.append(contents),
            _ => data.overwrite(contents),
        }
        debug!("Wrote {} bytes to '{}' ({})", contents.len(), path, mode);
        Ok(None)
    }

    /// Deletes the file at `path`.
    pub fn rm(&mut self, path: &str) -> Result<(), FilesystemError> {
        require(path, "path")?;
        let node = self.resolve_path(path)?;
        self.ensure_file(node, path)?;

        let absolute = self.absolute_path(node);
        self.tree.delete(Target::Node(node)).context(TreeSnafu)?;
        debug!("Removed file '{}'", absolute);
        Ok(())
    }

    /// Renames the node at `path` in place.
    ///
    /// Only a sibling of the same kind blocks the new name, a file and a
    /// directory may share one.
    pub fn rn(&mut self, path: &str, name: &str) -> Result<NodeId, FilesystemError> {
        require(path, "path")?;
        require(name, "name")?;
        let node = self.resolve_path(path)?;
        ensure!(node != self.root, RootRenameSnafu);
        validate_name(name)?;

        let parent = self.tree.parent(node).context(RootRenameSnafu)?;
        let entry = self
            .entry(node)
            .ok_or(TreeError::NodeNotFoundError)
            .context(TreeSnafu)?;
        let collision = self
            .children_named(parent, name)
            .any(|(sibling, other)| sibling != node && other.same_kind(entry));
        ensure!(!collision, NameTakenSnafu { name });

        if let Some(entry) = self.tree.get_mut(node) {
            debug!("Renaming '{}' to '{}'", entry.name(), name);
            entry.rename(name);
        }
        Ok(node)
    }

    /// Copies `target` and its whole subtree into the `destination` directory.
    ///
    /// Names may repeat at the destination. Returns the root of the copy.
    pub fn cp<'a, 'b>(
        &mut self,
        target: impl Into<Location<'a>>,
        destination: impl Into<Location<'b>>,
    ) -> Result<NodeId, FilesystemError> {
        let (target, destination) = (target.into(), destination.into());
        require_location(target, "target")?;
        require_location(destination, "destination")?;
        let source = self.resolve_location(target)?;
        let parent = self.resolve_location(destination)?;
        ensure!(source != self.root, RootCopySnafu);
        self.ensure_directory(parent, &self.describe(destination))?;

        let subtree = self
            .tree
            .snapshot(source)
            .ok_or(TreeError::NodeNotFoundError)
            .context(TreeSnafu)?;
        let copy = self.tree.graft(subtree, parent).context(TreeSnafu)?;
        debug!(
            "Copied '{}' to '{}'",
            self.absolute_path(source),
            self.absolute_path(copy)
        );
        Ok(copy)
    }

    /// Moves `target` and its subtree into the `destination` directory.
    ///
    /// The result equals a copy followed by deleting the original, except that
    /// the moved nodes keep their identity: a cursor inside the moved subtree
    /// follows it.
    pub fn mv<'a, 'b>(
        &mut self,
        target: impl Into<Location<'a>>,
        destination: impl Into<Location<'b>>,
    ) -> Result<NodeId, FilesystemError> {
        let (target, destination) = (target.into(), destination.into());
        require_location(target, "target")?;
        require_location(destination, "destination")?;
        let source = self.resolve_location(target)?;
        let parent = self.resolve_location(destination)?;
        ensure!(source != self.root, RootMoveSnafu);
        self.ensure_directory(parent, &self.describe(destination))?;
        ensure!(
            !self.tree.is_ancestor_of(source, parent),
            MoveIntoSelfSnafu {
                path: self.describe(target),
            }
        );

        let from = self.absolute_path(source);
        self.tree.relocate(source, parent).context(TreeSnafu)?;
        debug!("Moved '{}' to '{}'", from, self.absolute_path(source));
        Ok(source)
    }

    /// Immediate children of the directory at `path`, or of the cursor.
    pub fn ls(&self, path: Option<&str>) -> Result<Vec<NodeId>, FilesystemError> {
        let node = match path {
            Some(path) => self.resolve_path(path)?,
            None => self.cursor,
        };
        self.ensure_directory(node, path.unwrap_or("."))?;

        Ok(self.tree.children(node))
    }

    /// Every node in the tree whose name matches the glob `query`.
    pub fn whereis(&self, query: &str) -> Result<Vec<NodeId>, FilesystemError> {
        require(query, "query")?;
        self.tree.search(query).context(TreeSnafu)
    }

    fn resolve_location(&self, location: Location<'_>) -> Result<NodeId, FilesystemError> {
        match location {
            Location::Path(path) => self.resolve_path(path),
            Location::Node(node) if self.tree.contains(node) => Ok(node),
            Location::Node(_) => Err(TreeError::NodeNotFoundError).context(TreeSnafu),
        }
    }

    fn describe(&self, location: Location<'_>) -> String {
        match location {
            Location::Path(path) => path.to_string(),
            Location::Node(node) => self.absolute_path(node),
        }
    }

    fn file_data(
        &self,
        node: NodeId,
        path: &str,
    ) -> Result<&FileData, FilesystemError> {
        self.entry(node)
            .and_then(Entry::file_data)
            .context(NotAFileSnafu { path })
    }

    fn ensure_directory(&self, node: NodeId, path: &str) -> Result<(), FilesystemError> {
        ensure!(
            self.entry(node).is_some_and(Entry::is_dir),
            NotADirectorySnafu { path }
        );
        Ok(())
    }

    fn ensure_file(&self, node: NodeId, path: &str) -> Result<(), FilesystemError> {
        ensure!(
            self.entry(node).is_some_and(Entry::is_file),
            NotAFileSnafu { path }
        );
        Ok(())
    }

    /// Children of `parent` called exactly `name`, `*` taken literally.
    fn children_named<'s>(
        &'s self,
        parent: NodeId,
        name: &'s str,
    ) -> impl Iterator<Item = (NodeId, &'s Entry)> + 's {
        self.tree
            .children(parent)
            .into_iter()
            .filter_map(|child| self.tree.get(child).map(|entry| (child, entry)))
            .filter(move |(_, entry)| entry.name() == name)
    }

    fn ensure_name_free(&self, parent: NodeId, name: &str) -> Result<(), FilesystemError> {
        let taken = self.children_named(parent, name).next().is_some();
        ensure!(!taken, NameTakenSnafu { name });
        Ok(())
    }
}

fn require(value: &str, parameter: &str) -> Result<(), FilesystemError> {
    ensure!(!value.is_empty(), MissingArgumentSnafu { parameter });
    Ok(())
}

fn require_location(location: Location<'_>, parameter: &str) -> Result<(), FilesystemError> {
    match location {
        Location::Path(path) => require(path, parameter),
        Location::Node(_) => Ok(()),
    }
}

fn validate_name(name: &str) -> Result<(), FilesystemError> {
    let valid = !name.is_empty() && name != "." && name != ".." && !name.contains('/');
    ensure!(valid, InvalidNameSnafu { name });
    Ok(())
}
