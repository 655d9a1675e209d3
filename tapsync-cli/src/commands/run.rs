//! `tapsync run`: update formulas and reconcile the pull request.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tapsync_git::SystemRunner;
use tapsync_sync::{diff::diff_change_set, pipeline, Collaborators, RunOptions, RunOutcome};

use super::TapArgs;

/// Arguments for `tapsync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub tap: TapArgs,

    /// Repository holding the formulas, as `owner/repo`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// ASCII-armored secret key used to sign the commit.
    #[arg(long, env = "TAPSYNC_GPG_KEY", hide_env_values = true)]
    pub gpg_key: Option<String>,

    /// File containing the ASCII-armored secret key.
    #[arg(long, env = "TAPSYNC_GPG_KEY_FILE", conflicts_with = "gpg_key")]
    pub gpg_key_file: Option<PathBuf>,

    /// Resolve and plan, print the diffs, and change nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// File that receives `key=value` step outputs.
    #[arg(long, env = "GITHUB_OUTPUT", hide = true)]
    pub github_output: Option<PathBuf>,
}

/// Run outputs. The proposal fields are present iff a pull request was
/// found or opened, which only happens on an updating, non-dry run.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct RunReport {
    updated: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    proposal_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proposal_url: Option<String>,
}

impl From<&RunOutcome> for RunReport {
    fn from(outcome: &RunOutcome) -> Self {
        Self {
            updated: outcome.updated,
            dry_run: outcome.dry_run,
            proposal_number: outcome.proposal.as_ref().map(|p| p.number),
            proposal_url: outcome.proposal.as_ref().map(|p| p.url.clone()),
        }
    }
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let mut config = self.tap.load_config()?;
        if let Some(repository) = &self.repository {
            config.repository = Some(repository.clone());
        }
        let signing_key = self.signing_key()?;
        let client = self.tap.client(&config);

        let options = RunOptions {
            root: self.tap.root.clone(),
            config,
            signing_key,
            dry_run: self.dry_run,
        };
        let outcome = pipeline::run(
            &options,
            Collaborators {
                releases: &client,
                proposals: &client,
                runner: &SystemRunner,
            },
        )
        .context("tapsync run failed")?;
        tracing::info!(
            "run finished in {}ms",
            (outcome.finished_at - outcome.started_at).num_milliseconds()
        );

        let report = RunReport::from(&outcome);
        match &self.github_output {
            Some(_) if report.dry_run => {
                tracing::info!("[dry-run] step outputs not written");
            }
            Some(path) => write_step_outputs(path, &report)?,
            None => {}
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_outcome(&outcome, &self.tap.root);
        }
        Ok(())
    }

    fn signing_key(&self) -> Result<Option<String>> {
        if let Some(key) = &self.gpg_key {
            return Ok(Some(key.clone()));
        }
        self.gpg_key_file
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read signing key {}", path.display()))
            })
            .transpose()
    }
}

/// Append an `updated` line, plus `proposal_number` and `proposal_url` when
/// the run produced a pull request.
fn write_step_outputs(path: &Path, report: &RunReport) -> Result<()> {
    let mut lines = format!("updated={}\n", report.updated);
    if let (Some(number), Some(url)) = (report.proposal_number, &report.proposal_url) {
        lines.push_str(&format!("proposal_number={number}\nproposal_url={url}\n"));
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(lines.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn print_outcome(outcome: &RunOutcome, root: &Path) {
    let prefix = if outcome.dry_run { "[dry-run] " } else { "" };

    if !outcome.updated {
        println!(
            "{prefix}✓ all {} formula(s) up to date, nothing to do",
            outcome.decisions.len()
        );
        return;
    }

    if outcome.dry_run {
        for diff in diff_change_set(&outcome.changes, root) {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
    }

    let verb = if outcome.dry_run { "would update" } else { "updated" };
    println!("{prefix}✓ {verb} {} formula(s)", outcome.changes.len());
    for change in &outcome.changes {
        println!("  ✎  {} {} → {}", change.name, change.from_tag, change.to_tag);
    }

    if let Some(sha) = &outcome.commit_sha {
        println!("✓ pushed {sha}");
    }
    if let Some(proposal) = &outcome.proposal {
        let state = if outcome.proposal_created { "opened" } else { "reused" };
        println!("✓ {state} pull request #{} {}", proposal.number, proposal.url);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn updated_report() -> RunReport {
        RunReport {
            updated: true,
            dry_run: false,
            proposal_number: Some(42),
            proposal_url: Some("https://github.com/o/r/pull/42".to_string()),
        }
    }

    fn no_update_report() -> RunReport {
        RunReport {
            updated: false,
            dry_run: false,
            proposal_number: None,
            proposal_url: None,
        }
    }

    #[test]
    fn step_outputs_are_appended() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output");
        std::fs::write(&path, "previous=1\n").unwrap();

        write_step_outputs(&path, &updated_report()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "previous=1\nupdated=true\nproposal_number=42\nproposal_url=https://github.com/o/r/pull/42\n"
        );
    }

    #[test]
    fn no_update_writes_only_updated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output");
        write_step_outputs(&path, &no_update_report()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "updated=false\n");
    }

    #[test]
    fn json_omits_proposal_unless_present() {
        let json = serde_json::to_value(no_update_report()).unwrap();
        assert_eq!(json, serde_json::json!({ "updated": false }));

        let json = serde_json::to_value(updated_report()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "updated": true,
                "proposal_number": 42,
                "proposal_url": "https://github.com/o/r/pull/42",
            })
        );
    }

    #[test]
    fn dry_run_report_is_marked() {
        let report = RunReport {
            dry_run: true,
            ..no_update_report()
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json, serde_json::json!({ "updated": false, "dry_run": true }));
    }
}
