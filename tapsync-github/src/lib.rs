//! # tapsync-github
//!
//! GitHub REST collaborators: release/tag lookup for upstream sources and
//! pull-request listing/creation for the tap itself.
//!
//! The transport is abstracted behind [`ReleaseSource`] and [`ProposalSource`]
//! so the resolver and reconciler can run against in-memory fakes.

pub mod api;
pub mod client;
pub mod error;
pub mod reconciler;
pub mod resolver;

pub use api::{
    LatestRelease, NewPullRequest, ProposalSource, PullRequest, ReleaseSource, TagRef,
};
pub use client::GithubClient;
pub use error::GithubError;
pub use reconciler::{ProposalReconciler, Reconciled};
pub use resolver::ReleaseResolver;
