//! Release context - build once, pass everywhere
//!
//! `ReleaseContext` is built a single time in `main` and threaded by reference
//! through every component call. It replaces ambient process state (shared
//! working directory, shared git client) with explicit parameters, so no
//! module reaches for implicit singletons.

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};

/// Everything workflow components need, owned in one place
pub struct ReleaseContext {
  /// Repository root (working tree root, absolute path)
  pub root: PathBuf,

  /// Release configuration (release.toml)
  pub config: ReleaseConfig,

  /// Version-control client for the repository
  pub git: SystemGit,

  /// When set, publishes run with the registry dry-run flag and the
  /// commit/push gate is never offered
  pub dry_run: bool,
}

impl ReleaseContext {
  /// Build the context from a directory inside the repository
  pub fn build(dir: &Path, dry_run: bool) -> ReleaseResult<Self> {
    let git = SystemGit::open(dir)?;
    let root = git.work_tree().to_path_buf();
    let config = ReleaseConfig::load(&root)?;

    Ok(Self {
      root,
      config,
      git,
      dry_run,
    })
  }
}
