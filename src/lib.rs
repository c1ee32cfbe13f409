//! An in-memory filesystem built on a generic named tree.
//!
//! [`tree`] holds the arena-backed hierarchy, [`filesystem`] layers
//! directories, files and a working directory on top of it, [`shell`] turns
//! command lines into filesystem calls and [`config`] seeds a filesystem from
//! YAML.
#![allow(clippy::enum_variant_names)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod filesystem;
pub mod shell;
pub mod tree;
