//! Error taxonomy for a tapsync run.
//!
//! Every variant is fatal: the run stops at the first error and reports its
//! message as the failure reason.

use std::path::PathBuf;

use thiserror::Error;

use tapsync_core::{CodecError, ConfigError};
use tapsync_git::GitError;
use tapsync_github::GithubError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration, identity, or signing setup is unusable.
    #[error("configuration failure: {0}")]
    Configuration(String),

    /// Release lookup failed for a manifest's upstream.
    #[error("upstream unavailable for {path}: {source}")]
    UpstreamUnavailable {
        path: PathBuf,
        #[source]
        source: GithubError,
    },

    /// The latest release tag could not be found among upstream tags.
    #[error("tag not found for {path}: {source}")]
    TagNotFound {
        path: PathBuf,
        #[source]
        source: GithubError,
    },

    /// A manifest's `url`/`tag`/`revision` stanza could not be understood.
    #[error("malformed manifest {path}: {source}")]
    MalformedManifest {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stage, branch, commit, or push failed.
    #[error("{0}")]
    Vcs(#[source] GitError),

    /// Listing or creating the pull request failed.
    #[error("proposal API failure: {0}")]
    ProposalApi(#[source] GithubError),
}

impl From<ConfigError> for SyncError {
    fn from(err: ConfigError) -> Self {
        SyncError::Configuration(err.to_string())
    }
}

impl From<GitError> for SyncError {
    fn from(err: GitError) -> Self {
        if err.is_configuration() {
            SyncError::Configuration(err.to_string())
        } else {
            SyncError::Vcs(err)
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::MalformedManifest`].
pub(crate) fn malformed(path: impl Into<PathBuf>, source: CodecError) -> SyncError {
    SyncError::MalformedManifest {
        path: path.into(),
        source,
    }
}
