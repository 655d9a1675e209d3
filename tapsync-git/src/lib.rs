//! # tapsync-git
//!
//! Process-level git/gpg collaborators.
//!
//! - [`runner`]: the [`CommandRunner`] seam over `std::process::Command`
//! - [`session`]: [`SigningSession`], an ephemeral GnuPG home holding the signing key
//! - [`committer`]: [`SignedCommitter`], stage → branch → signed commit → push

pub mod committer;
pub mod error;
pub mod runner;
pub mod session;

pub use committer::{CommitSettings, CommitStage, CommitterState, PublishedCommit, SignedCommitter};
pub use error::GitError;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use session::SigningSession;
