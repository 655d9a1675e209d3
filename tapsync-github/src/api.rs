//! Wire types and transport traits.

use serde::{Deserialize, Serialize};

use tapsync_core::{Proposal, SourceId};

use crate::error::GithubError;

/// Page size requested from every paginated endpoint.
pub const PER_PAGE: u32 = 100;

/// `GET /repos/{owner}/{repo}/releases/latest`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestRelease {
    pub tag_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagCommit {
    pub sha: String,
}

/// One entry of `GET /repos/{owner}/{repo}/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagRef {
    pub name: String,
    pub commit: TagCommit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoInfo {
    pub default_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

/// The subset of a pull request object we read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: Account,
    pub head: BranchRef,
}

impl From<PullRequest> for Proposal {
    fn from(pr: PullRequest) -> Self {
        Proposal {
            number: pr.number,
            url: pr.html_url,
            title: pr.title,
            author: pr.user.login,
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    /// Source branch name.
    pub head: String,
    /// Target branch name.
    pub base: String,
    pub body: String,
}

/// Release and tag metadata for upstream repositories.
pub trait ReleaseSource {
    fn latest_release(&self, repo: &SourceId) -> Result<LatestRelease, GithubError>;

    /// One page (1-based) of tags, newest first, at most [`PER_PAGE`] entries.
    fn list_tags(&self, repo: &SourceId, page: u32) -> Result<Vec<TagRef>, GithubError>;
}

/// Pull requests on the tap repository.
pub trait ProposalSource {
    /// Whether calls will carry credentials; creating a pull request needs them.
    fn is_authenticated(&self) -> bool {
        true
    }

    fn default_branch(&self, repo: &SourceId) -> Result<String, GithubError>;

    /// One page (1-based) of open pull requests targeting `base`.
    fn list_open_pulls(
        &self,
        repo: &SourceId,
        base: &str,
        page: u32,
    ) -> Result<Vec<PullRequest>, GithubError>;

    fn create_pull(
        &self,
        repo: &SourceId,
        pull: &NewPullRequest,
    ) -> Result<PullRequest, GithubError>;
}
