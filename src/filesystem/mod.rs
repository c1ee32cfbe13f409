//! Virtual filesystem on top of the generic tree.
//!
//! Adds directory and file entries, Unix-style path resolution against a
//! current directory and the command surface (`mkdir`, `rmdir`, `cd`, `cat`,
//! `rm`, `rn`, `cp`, `mv`, `ls`, `whereis`).

mod entry;
mod error;
mod filesystem;
mod resolver;
mod shared;

pub use entry::{Entry, EntryKind, FileData};
pub use error::FilesystemError;
pub use filesystem::{CatMode, Location, VirtualFilesystem};
pub use shared::SharedFilesystem;
