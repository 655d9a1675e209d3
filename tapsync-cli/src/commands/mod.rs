pub mod check;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tapsync_core::Config;
use tapsync_github::GithubClient;

/// Options shared by every subcommand: where the tap lives and how to reach GitHub.
#[derive(Args, Debug)]
pub struct TapArgs {
    /// Root of the tap's git checkout.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (defaults to `tapsync.yaml` under the root, if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// GitHub API base URL, e.g. for GitHub Enterprise.
    #[arg(long)]
    pub api_url: Option<String>,

    /// GitHub token used for every API call.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl TapArgs {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.root, self.config.as_deref())
            .context("failed to load tapsync configuration")?;
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        Ok(config)
    }

    pub fn client(&self, config: &Config) -> GithubClient {
        GithubClient::new(config.api_url.as_str(), self.token.clone())
    }
}
