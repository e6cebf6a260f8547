//! # reposync-sync
//!
//! The repository synchronization engine.
//!
//! 1. [`resolver`]: which repositories receive the template's files
//! 2. [`scan`]: which tracked paths differ in each of them
//! 3. [`push`]: commit the differences to each default branch, or
//! 4. [`pull_request`]: report them as a single upserted PR comment
//!
//! [`pipeline::Pipeline`] runs the stages in order for a [`reposync_core::RunContext`].

pub mod error;
pub mod pipeline;
pub mod pull_request;
pub mod push;
pub mod resolver;
pub mod scan;

#[cfg(test)]
pub(crate) mod fake;

pub use error::SyncError;
pub use pipeline::{Pipeline, Plan, RunOutcome};
pub use pull_request::{upsert_report, CommentAction};
pub use push::{PushExecutor, RepoOutcome, RepoResult};
pub use resolver::{resolve, Resolution};
pub use scan::Scanner;
