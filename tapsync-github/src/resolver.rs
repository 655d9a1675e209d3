//! Upstream release resolution.
//!
//! No caching: two manifests sharing an upstream query it twice.

use tapsync_core::SourceId;

use crate::api::{ReleaseSource, PER_PAGE};
use crate::error::GithubError;

/// Resolves the latest release tag of an upstream and the commit a tag points to.
pub struct ReleaseResolver<'a> {
    source: &'a dyn ReleaseSource,
}

impl<'a> ReleaseResolver<'a> {
    pub fn new(source: &'a dyn ReleaseSource) -> Self {
        Self { source }
    }

    /// Tag name of the most recent published release.
    pub fn latest_tag(&self, repo: &SourceId) -> Result<String, GithubError> {
        let release = self.source.latest_release(repo)?;
        tracing::debug!("{repo}: latest release is {}", release.tag_name);
        Ok(release.tag_name)
    }

    /// Commit SHA that `tag` points to, scanning tag pages until found.
    pub fn resolve_revision(&self, repo: &SourceId, tag: &str) -> Result<String, GithubError> {
        let mut page = 1;
        loop {
            let tags = self.source.list_tags(repo, page)?;
            if let Some(found) = tags.iter().find(|t| t.name == tag) {
                tracing::debug!("{repo}: {tag} -> {}", found.commit.sha);
                return Ok(found.commit.sha.clone());
            }
            if tags.len() < PER_PAGE as usize {
                return Err(GithubError::TagNotFound {
                    repo: repo.clone(),
                    tag: tag.to_string(),
                });
            }
            page += 1;
        }
    }
}
