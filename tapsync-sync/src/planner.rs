//! Update planning.
//!
//! Tag equality is the only trigger: a manifest whose pinned tag equals the
//! upstream's latest release tag is up to date, whatever its stored revision.
//! The revision is always re-derived from the tag being pinned, and is only
//! looked up when the tag actually changes.

use tapsync_core::{codec, Change, Manifest, Release, UpdateDecision};
use tapsync_github::{GithubError, ReleaseResolver};

use crate::error::{malformed, SyncError};

/// Pure decision for a manifest given the resolved latest release.
pub fn decide(manifest: Manifest, release: &Release) -> UpdateDecision {
    if manifest.pinned_tag == release.tag_name {
        return UpdateDecision::up_to_date(manifest);
    }
    UpdateDecision {
        manifest,
        needs_update: true,
        new_tag: release.tag_name.clone(),
        new_revision: release.commit_sha.clone(),
    }
}

/// Resolve upstream state for `manifest` and decide.
pub fn plan(manifest: Manifest, resolver: &ReleaseResolver<'_>) -> Result<UpdateDecision, SyncError> {
    let source = manifest
        .source_id()
        .map_err(|e| malformed(&manifest.path, e))?;

    let latest = resolver
        .latest_tag(&source)
        .map_err(|e| upstream_err(&manifest, e))?;
    if latest == manifest.pinned_tag {
        tracing::info!("{}: up to date at {latest}", manifest.name);
        return Ok(UpdateDecision::up_to_date(manifest));
    }

    let commit_sha = resolver
        .resolve_revision(&source, &latest)
        .map_err(|e| upstream_err(&manifest, e))?;
    tracing::info!(
        "{}: {} -> {latest} ({commit_sha})",
        manifest.name,
        manifest.pinned_tag
    );
    Ok(decide(
        manifest,
        &Release {
            tag_name: latest,
            commit_sha,
        },
    ))
}

/// Render the rewritten text for a decision that needs an update.
pub fn to_change(decision: &UpdateDecision) -> Result<Option<Change>, SyncError> {
    if !decision.needs_update {
        return Ok(None);
    }
    let manifest = &decision.manifest;
    let new_raw_text = codec::render(&manifest.raw_text, &decision.new_tag, &decision.new_revision)
        .map_err(|e| malformed(&manifest.path, e))?;
    Ok(Some(Change {
        path: manifest.path.clone(),
        name: manifest.name.clone(),
        from_tag: manifest.pinned_tag.clone(),
        to_tag: decision.new_tag.clone(),
        to_revision: decision.new_revision.clone(),
        old_raw_text: manifest.raw_text.clone(),
        new_raw_text,
    }))
}

fn upstream_err(manifest: &Manifest, source: GithubError) -> SyncError {
    let path = manifest.path.clone();
    match source {
        GithubError::TagNotFound { .. } => SyncError::TagNotFound { path, source },
        source => SyncError::UpstreamUnavailable { path, source },
    }
}
