//! Definition of the crate's error and result.

use std::io;

use thiserror::Error;

/// The library's error enum.
#[derive(Debug, Error)]
pub enum GroupingError {
    /// Invalid argument was passed by the user.
    #[error("An invalid argument was passed: '{0}'")]
    InvalidArgument(String),
    /// An error appeared related to the schema.
    #[error("Schema error: '{0}'")]
    SchemaError(String),
    /// IO error, surfaced by a value accessor or the index.
    #[error("An IO error occurred: '{0}'")]
    Io(#[from] io::Error),
}
