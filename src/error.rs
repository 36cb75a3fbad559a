#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures local to a single pane. None of them is fatal.
#[derive(Debug, Error)]
pub enum PaneError {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not in the current listing", .0.display())]
    StaleReference(PathBuf),
}

pub type PaneResult<T> = Result<T, PaneError>;
