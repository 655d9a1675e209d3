//! `tapsync check`: pinned vs. latest release for every formula.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tapsync_core::UpdateDecision;
use tapsync_sync::{pipeline, RunOptions};

use super::TapArgs;

/// Arguments for `tapsync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub tap: TapArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckJson {
    name: String,
    path: String,
    pinned_tag: String,
    latest_tag: String,
    needs_update: bool,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "formula")]
    name: String,
    #[tabled(rename = "pinned")]
    pinned: String,
    #[tabled(rename = "latest")]
    latest: String,
    #[tabled(rename = "status")]
    status: String,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let config = self.tap.load_config()?;
        let client = self.tap.client(&config);
        let options = RunOptions {
            root: self.tap.root.clone(),
            config,
            signing_key: None,
            dry_run: true,
        };
        let decisions = pipeline::check(&options, &client).context("tapsync check failed")?;

        if self.json {
            let rows: Vec<CheckJson> = decisions.iter().map(to_json).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if decisions.is_empty() {
            println!("No formulas found.");
            return Ok(());
        }

        let outdated = decisions.iter().filter(|d| d.needs_update).count();
        let mut table = Table::new(decisions.iter().map(to_row));
        table.with(Style::rounded());
        println!("{table}");
        if outdated == 0 {
            println!("✓ all {} formula(s) up to date", decisions.len());
        } else {
            println!(
                "{outdated} of {} formula(s) behind upstream. Run 'tapsync run' to update.",
                decisions.len()
            );
        }
        Ok(())
    }
}

fn to_json(decision: &UpdateDecision) -> CheckJson {
    CheckJson {
        name: decision.manifest.name.clone(),
        path: decision.manifest.path.display().to_string(),
        pinned_tag: decision.manifest.pinned_tag.clone(),
        latest_tag: decision.new_tag.clone(),
        needs_update: decision.needs_update,
    }
}

fn to_row(decision: &UpdateDecision) -> CheckRow {
    let status = if decision.needs_update {
        "update available".yellow().bold().to_string()
    } else {
        "up to date".green().to_string()
    };
    CheckRow {
        name: decision.manifest.name.clone(),
        pinned: decision.manifest.pinned_tag.clone(),
        latest: decision.new_tag.clone(),
        status,
    }
}
