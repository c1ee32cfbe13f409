use snafu::Snafu;

use crate::tree::TreeError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FilesystemError {
    #[snafu(display("Missing argument: {}", parameter))]
    MissingArgumentError { parameter: String },
    #[snafu(display("Path not found: {}", path))]
    PathNotFoundError { path: String },
    #[snafu(display("No more directories beyond the root directory"))]
    AboveRootError,
    #[snafu(display("Name already taken: {}", name))]
    NameTakenError { name: String },
    #[snafu(display("Invalid name: '{}'", name))]
    InvalidNameError { name: String },
    #[snafu(display("The root directory cannot be deleted"))]
    RootDeletionError,
    #[snafu(display("The root directory cannot be renamed"))]
    RootRenameError,
    #[snafu(display("The root directory cannot be copied"))]
    RootCopyError,
    #[snafu(display("The root directory cannot be moved"))]
    RootMoveError,
    #[snafu(display("Cannot move '{}' into its own subtree", path))]
    MoveIntoSelfError { path: String },
    #[snafu(display("Not a directory: {}", path))]
    NotADirectoryError { path: String },
    #[snafu(display("Not a file: {}", path))]
    NotAFileError { path: String },
    #[snafu(display("File not found: {}", path))]
    FileNotFoundError { path: String },
    #[snafu(display("Unknown cat mode '{}', expected '', '>' or '>>'", mode))]
    InvalidCatModeError { mode: String },
    #[snafu(display("Tree operation failed"))]
    TreeError { source: TreeError },
}
