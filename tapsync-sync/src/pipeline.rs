//! Pipeline entrypoint used by the CLI.
//!
//! ```text
//! discover → plan × N → change set ─┬─ empty → no update
//!                                   └─ write → sign/commit/push → reconcile PR
//! ```
//!
//! Everything up to and including the change set is computed before the
//! first write, so a manifest that fails to parse or resolve leaves the tree,
//! the branch and the pull request untouched.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use tapsync_core::{ChangeSet, Config, Proposal, UpdateDecision};
use tapsync_git::{CommandRunner, CommitSettings, SignedCommitter, SigningSession};
use tapsync_github::{ProposalReconciler, ProposalSource, ReleaseResolver, ReleaseSource};

use crate::discovery::discover;
use crate::error::SyncError;
use crate::planner::{plan, to_change};
use crate::writer;

/// External collaborators for a run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub releases: &'a dyn ReleaseSource,
    pub proposals: &'a dyn ProposalSource,
    pub runner: &'a dyn CommandRunner,
}

/// Inputs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root of the tap's git checkout.
    pub root: PathBuf,
    pub config: Config,
    /// Armored secret key used to sign the commit.
    pub signing_key: Option<String>,
    /// Plan and report only; no writes, commits, pushes or API mutations.
    pub dry_run: bool,
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// `true` iff at least one manifest changed.
    pub updated: bool,
    /// Found-or-created pull request; `None` when not updated or in dry-run.
    pub proposal: Option<Proposal>,
    /// Whether `proposal` was opened by this run.
    pub proposal_created: bool,
    pub commit_sha: Option<String>,
    pub decisions: Vec<UpdateDecision>,
    pub changes: ChangeSet,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Discover and plan every manifest without changing anything.
pub fn check(
    options: &RunOptions,
    releases: &dyn ReleaseSource,
) -> Result<Vec<UpdateDecision>, SyncError> {
    let dir = options.config.manifest_dir_at(&options.root);
    let resolver = ReleaseResolver::new(releases);
    discover(&dir)?
        .into_iter()
        .map(|manifest| plan(manifest, &resolver))
        .collect()
}

/// Run the full pipeline once.
pub fn run(options: &RunOptions, collab: Collaborators<'_>) -> Result<RunOutcome, SyncError> {
    let started_at = Utc::now();
    let config = &options.config;

    // Fail on missing remote settings before any upstream traffic.
    let remote = if options.dry_run {
        None
    } else {
        let repo = config.repository_id()?;
        let key = options
            .signing_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                SyncError::Configuration("no signing key provided".to_string())
            })?;
        if !collab.proposals.is_authenticated() {
            return Err(SyncError::Configuration(
                "GitHub API token required; use --token or GITHUB_TOKEN".to_string(),
            ));
        }
        Some((repo, key))
    };

    let decisions = check(options, collab.releases)?;
    let mut changes = ChangeSet::new();
    for decision in &decisions {
        if let Some(change) = to_change(decision)? {
            changes.push(change);
        }
    }

    let mut outcome = RunOutcome {
        updated: !changes.is_empty(),
        proposal: None,
        proposal_created: false,
        commit_sha: None,
        decisions,
        changes,
        dry_run: options.dry_run,
        started_at,
        finished_at: started_at,
    };

    let Some((repo, key)) = remote.filter(|_| outcome.updated) else {
        if outcome.updated {
            tracing::info!("[dry-run] {} manifest(s) would be updated", outcome.changes.len());
        } else {
            tracing::info!("all manifests are up to date; no update");
        }
        outcome.finished_at = Utc::now();
        return Ok(outcome);
    };

    let written: Vec<PathBuf> = writer::apply(&outcome.changes, false)?
        .iter()
        .map(|w| w.path().to_path_buf())
        .collect();

    let session = SigningSession::import(collab.runner, key)?;
    let settings = CommitSettings {
        identity: config.identity.clone(),
        work_branch: config.work_branch.clone(),
        remote: config.remote.clone(),
        message: config.commit_message.clone(),
    };
    let published = SignedCommitter::new(collab.runner, &session, &options.root, settings)
        .publish(written.iter().map(PathBuf::as_path))?;

    let reconciler = ProposalReconciler::new(collab.proposals, repo, &config.identity.login);
    let reconciled = reconciler
        .reconcile(
            &config.proposal_title,
            &proposal_body(&outcome.changes),
            &config.work_branch,
        )
        .map_err(SyncError::ProposalApi)?;

    if let Err(err) = session.close() {
        tracing::warn!("failed to remove signing session: {err}");
    }

    outcome.commit_sha = Some(published.sha);
    outcome.proposal = Some(reconciled.proposal);
    outcome.proposal_created = reconciled.created;
    outcome.finished_at = Utc::now();
    Ok(outcome)
}

/// Markdown body listing every updated formula.
pub fn proposal_body(changes: &ChangeSet) -> String {
    let mut body = String::from(
        "Automated update of formulas to their latest upstream releases.\n\n\
         | Formula | From | To | Revision |\n\
         |---------|------|----|----------|\n",
    );
    for change in changes {
        let short: String = change.to_revision.chars().take(12).collect();
        body.push_str(&format!(
            "| {} | `{}` | `{}` | `{}` |\n",
            change.name, change.from_tag, change.to_tag, short
        ));
    }
    body
}
