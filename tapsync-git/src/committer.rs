//! Signed commit and push of the change set.
//!
//! ## States
//!
//! `New → Configured → StagingDone → BranchReady → Committed → Pushed`
//!
//! 1. Configure identity and signing in the repository-local git config.
//! 2. Stage every changed path.
//! 3. Switch to the work branch, creating or resetting it at the current HEAD.
//! 4. Create one signed commit.
//! 5. Force-push the branch; it belongs to this automation alone.
//!
//! A failed stage leaves earlier stages in place. Each run starts from a
//! fresh checkout, so nothing is rolled back.

use std::fmt;
use std::path::{Path, PathBuf};

use tapsync_core::Identity;

use crate::error::GitError;
use crate::runner::{CommandRunner, CommandSpec};
use crate::session::SigningSession;

/// The five committer steps, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
    Configure,
    Stage,
    Branch,
    Commit,
    Push,
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommitStage::Configure => "configure identity",
            CommitStage::Stage => "stage changes",
            CommitStage::Branch => "switch branch",
            CommitStage::Commit => "commit",
            CommitStage::Push => "push",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitterState {
    New,
    Configured,
    StagingDone,
    BranchReady,
    Committed,
    Pushed,
}

/// Fixed conventions for the automation's commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSettings {
    pub identity: Identity,
    pub work_branch: String,
    pub remote: String,
    pub message: String,
}

/// What was published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCommit {
    pub sha: String,
    pub branch: String,
}

pub struct SignedCommitter<'a> {
    runner: &'a dyn CommandRunner,
    session: &'a SigningSession<'a>,
    repo_dir: PathBuf,
    settings: CommitSettings,
    state: CommitterState,
    sha: Option<String>,
}

impl<'a> SignedCommitter<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        session: &'a SigningSession<'a>,
        repo_dir: impl Into<PathBuf>,
        settings: CommitSettings,
    ) -> Self {
        Self {
            runner,
            session,
            repo_dir: repo_dir.into(),
            settings,
            state: CommitterState::New,
            sha: None,
        }
    }

    pub fn state(&self) -> CommitterState {
        self.state
    }

    /// Run all five steps in order.
    pub fn publish<'p>(
        mut self,
        paths: impl IntoIterator<Item = &'p Path>,
    ) -> Result<PublishedCommit, GitError> {
        self.configure()?;
        self.stage(paths)?;
        self.switch_branch()?;
        let sha = self.commit()?;
        self.push()?;
        Ok(PublishedCommit {
            sha,
            branch: self.settings.work_branch.clone(),
        })
    }

    pub fn configure(&mut self) -> Result<(), GitError> {
        self.expect_state(CommitStage::Configure, CommitterState::New)?;
        let identity = &self.settings.identity;
        let entries = [
            ("user.name", identity.name.as_str()),
            ("user.email", identity.email.as_str()),
            ("user.signingkey", self.session.fingerprint()),
            ("commit.gpgsign", "true"),
            ("tag.gpgsign", "true"),
        ];
        for (key, value) in entries {
            self.git(CommitStage::Configure, ["config", key, value])?;
        }
        tracing::info!(
            "configured git identity {} <{}>",
            identity.name,
            identity.email
        );
        self.state = CommitterState::Configured;
        Ok(())
    }

    pub fn stage<'p>(&mut self, paths: impl IntoIterator<Item = &'p Path>) -> Result<(), GitError> {
        self.expect_state(CommitStage::Stage, CommitterState::Configured)?;
        let mut args = vec!["add".to_string(), "--".to_string()];
        args.extend(paths.into_iter().map(|p| {
            p.strip_prefix(&self.repo_dir)
                .unwrap_or(p)
                .display()
                .to_string()
        }));
        let staged = args.len() - 2;
        self.git(CommitStage::Stage, args)?;
        tracing::info!("staged {staged} file(s)");
        self.state = CommitterState::StagingDone;
        Ok(())
    }

    pub fn switch_branch(&mut self) -> Result<(), GitError> {
        self.expect_state(CommitStage::Branch, CommitterState::StagingDone)?;
        let branch = self.settings.work_branch.clone();
        self.git(CommitStage::Branch, ["checkout", "-B", branch.as_str()])?;
        tracing::info!("on branch {branch}");
        self.state = CommitterState::BranchReady;
        Ok(())
    }

    /// Create the signed commit and return its SHA.
    pub fn commit(&mut self) -> Result<String, GitError> {
        self.expect_state(CommitStage::Commit, CommitterState::BranchReady)?;
        let message = self.settings.message.clone();
        self.git(CommitStage::Commit, ["commit", "-S", "-m", message.as_str()])?;
        let sha = self
            .git(CommitStage::Commit, ["rev-parse", "HEAD"])?
            .trim()
            .to_string();
        tracing::info!("created signed commit {sha}");
        self.sha = Some(sha.clone());
        self.state = CommitterState::Committed;
        Ok(sha)
    }

    pub fn push(&mut self) -> Result<(), GitError> {
        self.expect_state(CommitStage::Push, CommitterState::Committed)?;
        let remote = self.settings.remote.clone();
        let branch = self.settings.work_branch.clone();
        self.git(
            CommitStage::Push,
            ["push", "--force", remote.as_str(), branch.as_str()],
        )?;
        tracing::info!("pushed {branch} to {remote}");
        self.state = CommitterState::Pushed;
        Ok(())
    }

    fn expect_state(&self, stage: CommitStage, expected: CommitterState) -> Result<(), GitError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GitError::OutOfOrder {
                stage,
                state: self.state,
            })
        }
    }

    fn git<I, S>(&self, stage: CommitStage, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (key, value) = self.session.env();
        let spec = CommandSpec::new("git")
            .args(args)
            .env(key, value)
            .current_dir(&self.repo_dir);
        self.runner
            .run_checked(&spec)
            .map(|out| out.stdout)
            .map_err(|source| GitError::Stage {
                stage,
                source: Box::new(source),
            })
    }
}
