//! Run-level errors
//!
//! Everything here aborts the whole run. Per-key failures live in
//! [`crate::fetch::FetchError`] and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Neither `<path>` nor `<path>.aux` exists
    #[error("file {} does not exist", .0.display())]
    AuxNotFound(PathBuf),

    #[error("a list of keys or an alias file must be provided")]
    NothingToDo,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse alias file {}: {source}", path.display())]
    AliasFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// User interrupt during the fetch loop
    #[error("interrupted, no output written")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
