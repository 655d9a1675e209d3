//! Domain types for a tapsync run.
//!
//! Every value here is owned by a single run and recomputed from scratch on
//! the next one. Manifests are never mutated in place; an update produces a
//! new [`Change`] carrying the rewritten text.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

// ---------------------------------------------------------------------------
// Source identity
// ---------------------------------------------------------------------------

/// The upstream repository a manifest packages, e.g. `gardenbed/basil-cli`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId {
    pub owner: String,
    pub repo: String,
}

impl SourceId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Derive the identity from a GitHub clone URL.
    ///
    /// Accepts `https://github.com/o/r(.git)`, `git@github.com:o/r(.git)`,
    /// `ssh://git@github.com/o/r` and `git://github.com/o/r`.
    pub fn from_url(url: &str) -> Result<Self, CodecError> {
        let unsupported = || CodecError::UnsupportedSource {
            url: url.to_string(),
        };

        let trimmed = url.trim();
        let path = ["https://", "http://", "ssh://", "git://"]
            .iter()
            .find_map(|scheme| trimmed.strip_prefix(scheme))
            .map(|rest| {
                let rest = rest.strip_prefix("git@").unwrap_or(rest);
                rest.strip_prefix("www.").unwrap_or(rest)
            })
            .and_then(|rest| rest.strip_prefix("github.com/"))
            .or_else(|| trimmed.strip_prefix("git@github.com:"))
            .ok_or_else(unsupported)?;

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        Self::from_slug(path).map_err(|_| unsupported())
    }

    /// Parse an `owner/repo` slug.
    pub fn from_slug(slug: &str) -> Result<Self, CodecError> {
        let mut parts = slug.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(CodecError::UnsupportedSource {
                url: slug.to_string(),
            }),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

// ---------------------------------------------------------------------------
// Manifest / release / decision
// ---------------------------------------------------------------------------

/// A tracked formula file as read at the start of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Identity of the manifest within the tracked directory.
    pub path: PathBuf,
    pub name: String,
    pub source_url: String,
    pub pinned_tag: String,
    pub pinned_revision: String,
    /// Byte-exact file contents.
    pub raw_text: String,
}

impl Manifest {
    pub fn source_id(&self) -> Result<SourceId, CodecError> {
        SourceId::from_url(&self.source_url)
    }
}

/// The latest published release of an upstream, with its tag resolved to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub commit_sha: String,
}

/// What the planner decided for one manifest.
///
/// When `needs_update` is false, `new_tag`/`new_revision` echo the pinned values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub manifest: Manifest,
    pub needs_update: bool,
    pub new_tag: String,
    pub new_revision: String,
}

impl UpdateDecision {
    pub fn up_to_date(manifest: Manifest) -> Self {
        Self {
            new_tag: manifest.pinned_tag.clone(),
            new_revision: manifest.pinned_revision.clone(),
            manifest,
            needs_update: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Change set
// ---------------------------------------------------------------------------

/// One rewritten manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: PathBuf,
    pub name: String,
    pub from_tag: String,
    pub to_tag: String,
    pub to_revision: String,
    pub old_raw_text: String,
    pub new_raw_text: String,
}

/// Ordered set of rewritten manifests, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// An open pull request proposing the update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub author: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
