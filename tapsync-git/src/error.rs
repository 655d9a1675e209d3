//! Error types for tapsync-git.

use std::path::PathBuf;

use thiserror::Error;

use crate::committer::{CommitStage, CommitterState};

/// All errors that can arise from git/gpg process work.
#[derive(Debug, Error)]
pub enum GitError {
    /// A process could not be spawned, or a file could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A process ran and exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The signing key could not be imported or identified.
    #[error("signing key setup failed: {0}")]
    Signing(String),

    /// A committer stage failed; `source` carries the underlying message.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: CommitStage,
        #[source]
        source: Box<GitError>,
    },

    /// A committer step was called before its predecessor completed.
    #[error("cannot {stage} while committer is {state:?}")]
    OutOfOrder {
        stage: CommitStage,
        state: CommitterState,
    },
}

impl GitError {
    /// Whether this failure belongs to identity/signing setup rather than a
    /// repository operation.
    pub fn is_configuration(&self) -> bool {
        match self {
            GitError::Signing(_) => true,
            GitError::Stage { stage, .. } | GitError::OutOfOrder { stage, .. } => {
                *stage == CommitStage::Configure
            }
            _ => false,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
