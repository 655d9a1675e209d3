//! Blocking GitHub REST client.

use serde::de::DeserializeOwned;

use tapsync_core::SourceId;

use crate::api::{
    LatestRelease, NewPullRequest, ProposalSource, PullRequest, ReleaseSource, RepoInfo, TagRef,
    PER_PAGE,
};
use crate::error::GithubError;

const API_VERSION: &str = "2022-11-28";

/// HTTP client for api.github.com (or a GitHub Enterprise API root).
#[derive(Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GithubClient {
    /// Create a client for the given API root, e.g. `https://api.github.com`.
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self
            .agent
            .request(method, url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION)
            .set("User-Agent", concat!("tapsync/", env!("CARGO_PKG_VERSION")));
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        let url = self.url(path);
        tracing::debug!("GET {url} {query:?}");
        let mut req = self.request("GET", &url);
        for (key, value) in query {
            req = req.query(key, value);
        }
        let response = req.call().map_err(|e| map_ureq("GET", &url, e))?;
        response
            .into_json()
            .map_err(|source| GithubError::Decode { url, source })
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, GithubError> {
        let url = self.url(path);
        tracing::debug!("POST {url}");
        let response = self
            .request("POST", &url)
            .send_json(body)
            .map_err(|e| map_ureq("POST", &url, e))?;
        response
            .into_json()
            .map_err(|source| GithubError::Decode { url, source })
    }
}

fn map_ureq(method: &'static str, url: &str, err: ureq::Error) -> GithubError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            // GitHub error bodies are `{"message": "..."}`; fall back to the raw body.
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or(body);
            GithubError::Http {
                method,
                url: url.to_string(),
                status,
                message,
            }
        }
        ureq::Error::Transport(transport) => GithubError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn page_query(page: u32) -> Vec<(&'static str, String)> {
    vec![("per_page", PER_PAGE.to_string()), ("page", page.to_string())]
}

impl ReleaseSource for GithubClient {
    fn latest_release(&self, repo: &SourceId) -> Result<LatestRelease, GithubError> {
        let path = format!("/repos/{}/{}/releases/latest", repo.owner, repo.repo);
        match self.get_json(&path, &[]) {
            Err(GithubError::Http { status: 404, .. }) => {
                Err(GithubError::NoRelease { repo: repo.clone() })
            }
            other => other,
        }
    }

    fn list_tags(&self, repo: &SourceId, page: u32) -> Result<Vec<TagRef>, GithubError> {
        let path = format!("/repos/{}/{}/tags", repo.owner, repo.repo);
        self.get_json(&path, &page_query(page))
    }
}

impl ProposalSource for GithubClient {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn default_branch(&self, repo: &SourceId) -> Result<String, GithubError> {
        let path = format!("/repos/{}/{}", repo.owner, repo.repo);
        let info: RepoInfo = self.get_json(&path, &[])?;
        Ok(info.default_branch)
    }

    fn list_open_pulls(
        &self,
        repo: &SourceId,
        base: &str,
        page: u32,
    ) -> Result<Vec<PullRequest>, GithubError> {
        let path = format!("/repos/{}/{}/pulls", repo.owner, repo.repo);
        let mut query = page_query(page);
        query.push(("state", "open".to_string()));
        query.push(("base", base.to_string()));
        self.get_json(&path, &query)
    }

    fn create_pull(
        &self,
        repo: &SourceId,
        pull: &NewPullRequest,
    ) -> Result<PullRequest, GithubError> {
        let path = format!("/repos/{}/{}/pulls", repo.owner, repo.repo);
        self.post_json(&path, pull)
    }
}
