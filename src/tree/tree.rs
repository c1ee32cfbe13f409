use std::collections::VecDeque;

use derive_more::From;
use indextree::{Arena, NodeId};
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::tree::{Pattern, PatternError};

/// Anything stored in a [`Tree`] must expose the name used for pattern lookups.
pub trait Named {
    fn name(&self) -> &str;
}

/// Either a concrete node or a glob pattern resolved through [`Tree::search`].
#[derive(Debug, Clone, Copy, From)]
pub enum Target<'a> {
    Node(NodeId),
    Pattern(&'a str),
}

/// An owned deep copy of a subtree, detached from any arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree<T> {
    pub value: T,
    pub children: Vec<Subtree<T>>,
}

/// Ordered multi-way tree with a single root.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Children are owned
/// through the arena links of their parent, the parent link of a child is only
/// a handle, so there is no ownership cycle. Child order is insertion order.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    arena: Arena<T>,
    root: Option<NodeId>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }
}

impl<T: Named> Tree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree that already holds `value` as its root.
    pub fn with_root(value: T) -> (Self, NodeId) {
        let mut arena = Arena::new();
        let root = arena.new_node(value);
        (
            Self {
                arena,
                root: Some(root),
            },
            root,
        )
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.root
            .map(|root| root.descendants(&self.arena).count())
            .unwrap_or(0)
    }

    /// Whether `node` is a live node of this tree.
    pub fn contains(&self, node: NodeId) -> bool {
        self.arena.get(node).is_some() && !node.is_removed(&self.arena)
    }

    pub fn get(&self, node: NodeId) -> Option<&T> {
        if self.contains(node) {
            self.arena.get(node).map(|n| n.get())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        if self.contains(node) {
            self.arena.get_mut(node).map(|n| n.get_mut())
        } else {
            None
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if self.contains(node) {
            self.arena.get(node).and_then(|n| n.parent())
        } else {
            None
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.contains(node) {
            node.children(&self.arena).collect()
        } else {
            Vec::new()
        }
    }

    /// `node` followed by its ancestors up to the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        if self.contains(node) {
            node.ancestors(&self.arena).collect()
        } else {
            Vec::new()
        }
    }

    /// Returns true when `ancestor` is `node` itself or lies on its path to the root.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.contains(node) && node.ancestors(&self.arena).any(|id| id == ancestor)
    }

    /// Inserts `value` under `parent`, or as the root when no parent is given.
    pub fn insert(&mut self, value: T, parent: Option<Target<'_>>) -> Result<NodeId, TreeError> {
        let parent = match parent {
            None if self.root.is_some() => return Err(TreeError::DuplicateRootError),
            None => {
                let root = self.arena.new_node(value);
                debug!("Established tree root");
                self.root = Some(root);
                return Ok(root);
            }
            Some(Target::Node(node)) if self.contains(node) => node,
            Some(Target::Node(_)) => return Err(TreeError::ParentNotFoundError),
            Some(Target::Pattern(pattern)) => *self
                .search(pattern)?
                .first()
                .ok_or(TreeError::ParentNotFoundError)?,
        };

        debug!("Inserting '{}' into the tree", value.name());
        let node = self.arena.new_node(value);
        parent.append(node, &mut self.arena);
        Ok(node)
    }

    /// Removes the targeted subtrees and returns how many were removed.
    pub fn delete(&mut self, target: Target<'_>) -> Result<usize, TreeError> {
        let targets = match target {
            Target::Node(node) if self.contains(node) => vec![node],
            Target::Node(_) => Vec::new(),
            Target::Pattern(pattern) => self.search(pattern)?,
        };
        if targets.is_empty() {
            return Err(TreeError::NodeNotFoundError);
        }

        let mut removed = 0;
        for node in targets {
            // Earlier removals may already have taken this node with them.
            if !self.contains(node) {
                continue;
            }
            if self.root == Some(node) {
                debug!("Deleting the tree root");
                self.root = None;
            }
            node.remove_subtree(&mut self.arena);
            removed += 1;
        }

        Ok(removed)
    }

    /// Depth-first search over the whole tree, root included.
    pub fn search(&self, pattern: &str) -> Result<Vec<NodeId>, TreeError> {
        match self.root {
            Some(root) => self.search_from(root, pattern),
            None => Ok(Vec::new()),
        }
    }

    /// Tests `node` itself, then recurses over its children in order.
    pub fn search_from(&self, node: NodeId, pattern: &str) -> Result<Vec<NodeId>, TreeError> {
        if !self.contains(node) {
            return Ok(Vec::new());
        }
        let pattern = Self::compile(pattern)?;

        Ok(node
            .descendants(&self.arena)
            .filter(|id| pattern.matches(self.arena[*id].get().name()))
            .collect())
    }

    /// Direct children of `node` whose name matches `pattern`.
    pub fn find(&self, node: NodeId, pattern: &str) -> Result<Vec<NodeId>, TreeError> {
        if !self.contains(node) {
            return Ok(Vec::new());
        }
        let pattern = Self::compile(pattern)?;

        Ok(node
            .children(&self.arena)
            .filter(|id| pattern.matches(self.arena[*id].get().name()))
            .collect())
    }

    /// Breadth-first levels, level 0 holding the root.
    pub fn traverse(&self) -> Vec<Vec<NodeId>> {
        let mut levels = Vec::new();
        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();

        while !queue.is_empty() {
            let level: Vec<NodeId> = queue.drain(..).collect();
            queue.extend(level.iter().flat_map(|id| id.children(&self.arena)));
            levels.push(level);
        }

        levels
    }

    /// Moves the subtree rooted at `node` to the end of `parent`'s children.
    ///
    /// Node ids inside the subtree stay valid. The root cannot be relocated
    /// since every other node lies below it.
    pub fn relocate(&mut self, node: NodeId, parent: NodeId) -> Result<(), TreeError> {
        if !self.contains(node) {
            return Err(TreeError::NodeNotFoundError);
        }
        if !self.contains(parent) || self.is_ancestor_of(node, parent) {
            return Err(TreeError::ParentNotFoundError);
        }

        node.detach(&mut self.arena);
        parent.append(node, &mut self.arena);
        Ok(())
    }

    fn compile(pattern: &str) -> Result<Pattern, TreeError> {
        Pattern::new(pattern).context(InvalidPatternSnafu)
    }
}

impl<T: Named + Clone> Tree<T> {
    /// Deep-copies the subtree rooted at `node`.
    pub fn snapshot(&self, node: NodeId) -> Option<Subtree<T>> {
        let value = self.get(node)?.clone();
        let children = node
            .children(&self.arena)
            .filter_map(|child| self.snapshot(child))
            .collect();

        Some(Subtree { value, children })
    }

    /// Inserts a copied subtree under `parent`, returning the new subtree root.
    pub fn graft(&mut self, subtree: Subtree<T>, parent: NodeId) -> Result<NodeId, TreeError> {
        let Subtree { value, children } = subtree;
        let node = self.insert(value, Some(Target::Node(parent)))?;
        for child in children {
            self.graft(child, node)?;
        }
        Ok(node)
    }
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Tree already has a root, a parent node must be given"))]
    DuplicateRootError,
    #[snafu(display("Parent node not found"))]
    ParentNotFoundError,
    #[snafu(display("Target node not found"))]
    NodeNotFoundError,
    #[snafu(display("Invalid search pattern"))]
    InvalidPatternError { source: PatternError },
}
