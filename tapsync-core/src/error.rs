//! Error types for tapsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or rewriting manifest text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// No `url '…', tag: '…', revision: '…'` stanza could be located.
    #[error("no `url`/`tag`/`revision` stanza found")]
    MissingUrlStanza,

    /// A replacement value would break out of its string literal.
    #[error("invalid {field} value {value:?}: quotes, backslashes and line breaks are not allowed")]
    InvalidValue { field: &'static str, value: String },

    /// The source URL does not name a GitHub repository.
    #[error("unsupported source URL '{url}'; expected a github.com repository")]
    UnsupportedSource { url: String },
}

/// Errors raised while loading `tapsync.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the config path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// A value is present but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}
