//! tapsync core library: domain types, manifest codec, configuration, errors.
//!
//! Public API surface:
//! - [`types`]: manifests, releases, decisions, change sets, proposals
//! - [`codec`]: parse / render of formula `url` stanzas
//! - [`config`]: `tapsync.yaml` loading
//! - [`error`]: [`CodecError`], [`ConfigError`]

pub mod codec;
pub mod config;
pub mod error;
pub mod types;

pub use codec::ManifestFields;
pub use config::{Config, Identity};
pub use error::{CodecError, ConfigError};
pub use types::{
    Change, ChangeSet, Manifest, Proposal, Release, SourceId, UpdateDecision,
};
