//! The errors produced while loading, merging and splitting word sets.
use std::{io, path::PathBuf};

use thiserror::Error;

/// Something went wrong reading or writing word set documents.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WordSetError {
    /// A required input file doesn't exist.
    #[error("{} not found", .0.display())]
    MissingFile(PathBuf),
    /// The file exists but couldn't be read.
    #[error("failed to read from {}: {}", .0.display(), .1)]
    FailedToRead(PathBuf, io::Error),
    /// An output file or directory couldn't be written.
    #[error("failed to write to {}: {}", .0.display(), .1)]
    FailedToWrite(PathBuf, io::Error),
    /// The document isn't valid JSON, or isn't shaped like a word set
    /// collection.
    #[error("failed to parse {}: {}", .0.display(), .1)]
    InvalidJson(PathBuf, serde_json::Error),
    /// A document couldn't be serialized.
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Unable to parse the manifest configuration.
    #[error("failed to parse config from {}: {}", .0.display(), .1)]
    ConfigError(PathBuf, toml::de::Error),
    /// The set's id can't be used as a file name.
    #[error("set id {0:?} can't be used as a file name")]
    InvalidSetId(String),
}

impl WordSetError {
    /// Maps a read failure, reporting [`io::ErrorKind::NotFound`] as
    /// [`WordSetError::MissingFile`].
    pub(crate) fn read(path: impl Into<PathBuf>, io_err: io::Error) -> Self {
        let path = path.into();
        match io_err.kind() {
            io::ErrorKind::NotFound => WordSetError::MissingFile(path),
            _ => WordSetError::FailedToRead(path, io_err),
        }
    }
}

/// A JSON object in the master document is missing something it needs.
///
/// Reported inside [`WordSetError::InvalidJson`].
#[derive(Debug, Error)]
pub enum ShapeError {
    /// The key is missing, or its value isn't a string.
    #[error("expected {0:?} to be a string")]
    NotAString(&'static str),
    /// The key is missing.
    #[error("missing {0:?}")]
    Missing(&'static str),
    /// The key's value isn't a list of the expected objects.
    #[error("invalid {0:?}: {1}")]
    InvalidList(&'static str, serde_json::Error),
}
