//! Core building blocks for channel-release
//!
//! - **config**: release configuration (release.toml) parsing and validation
//! - **context**: release context built once and passed to every component
//! - **error**: error taxonomy with contextual help messages
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
