//! # tapsync-sync
//!
//! The update pipeline: discover formulas, plan against upstream releases,
//! rewrite, commit, and reconcile the pull request.
//!
//! Call [`pipeline::run`] for a full run or [`pipeline::check`] for a
//! read-only report.

pub mod diff;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod planner;
pub mod writer;

pub use error::SyncError;
pub use pipeline::{check, run, Collaborators, RunOptions, RunOutcome};
pub use writer::WriteResult;
