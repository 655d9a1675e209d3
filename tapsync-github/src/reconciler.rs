//! Reuse-or-create reconciliation of the update pull request.
//!
//! An open pull request from our own login whose head is the work branch is
//! returned untouched; its review thread survives repeated runs. Only when
//! none exists is a new one created.

use tapsync_core::{Proposal, SourceId};

use crate::api::{NewPullRequest, ProposalSource, PER_PAGE};
use crate::error::GithubError;

/// Result of [`ProposalReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub proposal: Proposal,
    /// `true` when the proposal was opened by this call.
    pub created: bool,
}

pub struct ProposalReconciler<'a> {
    source: &'a dyn ProposalSource,
    repo: SourceId,
    login: String,
}

impl<'a> ProposalReconciler<'a> {
    pub fn new(source: &'a dyn ProposalSource, repo: SourceId, login: impl Into<String>) -> Self {
        Self {
            source,
            repo,
            login: login.into(),
        }
    }

    pub fn default_branch(&self) -> Result<String, GithubError> {
        self.source.default_branch(&self.repo)
    }

    /// Open proposal from our login with head `work_branch` targeting `base`.
    pub fn find_open(&self, work_branch: &str, base: &str) -> Result<Option<Proposal>, GithubError> {
        let mut page = 1;
        loop {
            let pulls = self.source.list_open_pulls(&self.repo, base, page)?;
            let count = pulls.len();
            if let Some(pr) = pulls
                .into_iter()
                .find(|pr| pr.head.name == work_branch && pr.user.login == self.login)
            {
                return Ok(Some(pr.into()));
            }
            if count < PER_PAGE as usize {
                return Ok(None);
            }
            page += 1;
        }
    }

    /// Return `existing` if present, otherwise open a new proposal.
    pub fn create_if_absent(
        &self,
        existing: Option<Proposal>,
        title: &str,
        body: &str,
        work_branch: &str,
        base: &str,
    ) -> Result<Reconciled, GithubError> {
        if let Some(proposal) = existing {
            tracing::info!("reusing open pull request #{}", proposal.number);
            return Ok(Reconciled {
                proposal,
                created: false,
            });
        }

        let pull = NewPullRequest {
            title: title.to_string(),
            head: work_branch.to_string(),
            base: base.to_string(),
            body: body.to_string(),
        };
        let created: Proposal = self.source.create_pull(&self.repo, &pull)?.into();
        tracing::info!("opened pull request #{}: {}", created.number, created.url);
        Ok(Reconciled {
            proposal: created,
            created: true,
        })
    }

    /// Resolve the default branch, then find or create the proposal.
    pub fn reconcile(
        &self,
        title: &str,
        body: &str,
        work_branch: &str,
    ) -> Result<Reconciled, GithubError> {
        let base = self.default_branch()?;
        let existing = self.find_open(work_branch, &base)?;
        self.create_if_absent(existing, title, body, work_branch, &base)
    }
}
