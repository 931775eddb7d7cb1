//! Error types for extraction runs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole extraction run.
///
/// Structural absence — a file or declaration pattern that simply is not
/// there — is never an error; it yields an empty result at the stage
/// concerned. Only I/O-level failures (unreadable or non-UTF-8 files,
/// failed directory scans) are fatal, because a partially extracted model
/// is worse than none.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A source file could not be read or decoded as UTF-8.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory listing or tree walk failed part-way through.
    #[error("failed to scan {path}: {source}")]
    DirScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extraction root does not exist or is not a directory.
    #[error("model root not found: {0}")]
    RootNotFound(PathBuf),

    /// Serializing the assembled document failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// Create a file-read error for the given path.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a directory-scan error for the given path.
    pub fn dir_scan(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirScan {
            path: path.into(),
            source,
        }
    }
}
