//! Error types for tapsync-github.

use thiserror::Error;

use tapsync_core::SourceId;

/// All errors that can arise from GitHub API calls.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The API answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {message}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset, …).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response body was not the JSON shape we expected.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// `releases/latest` returned 404: the upstream has never published a release.
    #[error("{repo} has no published release")]
    NoRelease { repo: SourceId },

    /// The tag does not exist upstream.
    #[error("tag '{tag}' not found in {repo}")]
    TagNotFound { repo: SourceId, tag: String },
}
