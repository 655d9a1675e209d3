//! `tapsync.yaml` configuration.
//!
//! Every key is optional; a missing file yields [`Config::default`]. The CLI
//! layers flags and environment variables on top of whatever is loaded here.
//!
//! ```yaml
//! manifest_dir: Formula
//! repository: gardenbed/homebrew-brew
//! work_branch: tapsync/update-formulas
//! identity:
//!   name: gardenbot
//!   email: bot@example.com
//!   login: gardenbot
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SourceId;

/// File name looked up at the repository root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tapsync.yaml";

/// Author identity used for commits and for recognising our own pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// Account login that authors pull requests.
    pub login: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "github-actions[bot]".to_string(),
            email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
            login: "github-actions[bot]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the tracked `*.rb` formulas, relative to the repo root.
    pub manifest_dir: PathBuf,
    /// `owner/repo` of the tap itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub work_branch: String,
    pub remote: String,
    pub commit_message: String,
    pub proposal_title: String,
    pub api_url: String,
    pub identity: Identity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from("Formula"),
            repository: None,
            work_branch: "tapsync/update-formulas".to_string(),
            remote: "origin".to_string(),
            commit_message: "Update formulas to latest releases".to_string(),
            proposal_title: "Update formulas to latest releases".to_string(),
            api_url: "https://api.github.com".to_string(),
            identity: Identity::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit = Some(path)` the file must exist. Otherwise
    /// `<root>/tapsync.yaml` is read if present and defaults are used if not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                path.to_path_buf()
            }
            None => {
                let path = root.join(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        // An empty file deserializes to unit, not a mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// The tap repository as a [`SourceId`]; required for any remote operation.
    pub fn repository_id(&self) -> Result<SourceId, ConfigError> {
        let slug = self.repository.as_deref().ok_or_else(|| {
            ConfigError::Invalid(
                "repository is not set; use --repository or GITHUB_REPOSITORY".to_string(),
            )
        })?;
        SourceId::from_slug(slug)
            .map_err(|_| ConfigError::Invalid(format!("repository '{slug}' is not owner/repo")))
    }

    /// Absolute manifest directory for a checkout rooted at `root`.
    pub fn manifest_dir_at(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest_dir)
    }
}
