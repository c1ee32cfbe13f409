use colored::Colorize;

use crate::filesystem::{Entry, VirtualFilesystem};
use crate::tree::{Named, NodeId};

/// Turns command results into terminal text.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Child name, directories marked with a trailing `/`. The root renders as `/`.
    pub fn entry_name(&self, entry: &Entry) -> String {
        if entry.is_dir() {
            let name = format!("{}/", entry.name());
            if self.color {
                name.blue().bold().to_string()
            } else {
                name
            }
        } else {
            entry.name().to_string()
        }
    }

    pub fn listing(&self, filesystem: &VirtualFilesystem, nodes: &[NodeId]) -> String {
        nodes
            .iter()
            .filter_map(|node| filesystem.entry(*node))
            .map(|entry| self.entry_name(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn paths(&self, filesystem: &VirtualFilesystem, nodes: &[NodeId]) -> String {
        nodes
            .iter()
            .map(|node| filesystem.absolute_path(*node))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per breadth-first level: `depth: name name ...`.
    pub fn levels(&self, filesystem: &VirtualFilesystem) -> String {
        filesystem
            .traverse()
            .iter()
            .enumerate()
            .map(|(depth, level)| {
                let names = level
                    .iter()
                    .filter_map(|node| filesystem.entry(*node))
                    .map(|entry| self.entry_name(entry))
                    .collect::<Vec<_>>()
                    .join("  ");
                format!("{depth}: {names}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn error(&self, message: &str) -> String {
        if self.color {
            message.red().to_string()
        } else {
            message.to_string()
        }
    }
}
