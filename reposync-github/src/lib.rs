//! # reposync-github
//!
//! GitHub REST implementation of [`reposync_core::Platform`], built on a
//! blocking `ureq` agent. Pagination follows `Link` headers; non-2xx
//! responses map to [`reposync_core::PlatformError`] with the upstream
//! `message` preserved.

pub mod client;
mod payload;

pub use client::{GitHubClient, DEFAULT_API_URL};
