//! Process collaborator.
//!
//! Every git and gpg invocation goes through [`CommandRunner`] so the
//! committer can be exercised without touching a real repository.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{io_err, GitError};

/// A fully described process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    /// Human-readable exit status, e.g. `exit status: 128`.
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner {
    /// Run to completion and capture output. Spawn failures are errors;
    /// a non-zero exit is reported through [`CommandOutput::success`].
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, GitError>;

    /// Run and turn a non-zero exit into [`GitError::CommandFailed`].
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput, GitError> {
        let output = self.run(spec)?;
        if output.success {
            return Ok(output);
        }
        let stderr = output.stderr.trim();
        let stderr = if stderr.is_empty() {
            output.stdout.trim()
        } else {
            stderr
        };
        Err(GitError::CommandFailed {
            command: spec.to_string(),
            status: output.status.clone(),
            stderr: stderr.to_string(),
        })
    }
}

/// Runs commands on the host with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, GitError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (key, value) in &spec.envs {
            cmd.env(key, value);
        }
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        tracing::debug!("running: {spec}");

        let output = cmd.output().map_err(|e| io_err(&spec.program, e))?;
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("git").args(["push", "--force", "origin", "main"]);
        assert_eq!(spec.to_string(), "git push --force origin main");
    }

    #[test]
    #[cfg(unix)]
    fn system_runner_captures_stdout() {
        let out = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "printf hello"]))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "hello");
    }

    #[test]
    #[cfg(unix)]
    fn run_checked_reports_stderr_verbatim() {
        let err = SystemRunner
            .run_checked(&CommandSpec::new("sh").args(["-c", "echo 'fatal: boom' >&2; exit 3"]))
            .unwrap_err();
        match err {
            GitError::CommandFailed { stderr, status, .. } => {
                assert_eq!(stderr, "fatal: boom");
                assert!(status.contains('3'), "status was {status}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_io_error() {
        let err = SystemRunner
            .run(&CommandSpec::new("tapsync-definitely-not-a-binary"))
            .unwrap_err();
        assert!(matches!(err, GitError::Io { .. }));
    }
}
