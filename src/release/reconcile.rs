//! Post-publish repository state reconciliation
//!
//! The publish-mode rewrite is not cleanly invertible, so reconciliation never
//! computes original names back: it discards the whole working tree delta via
//! version control, then re-applies the single change that must survive (the
//! umbrella package's version bump) and optionally commits and pushes it.

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::manifest::{MANIFEST_FILENAME, PackageManifest};
use crate::release::ReleaseChannel;
use crate::release::plan::VersionPlan;
use crate::release::rewrite::{RewriteOptions, rewrite_packages};
use std::path::PathBuf;

/// Restore pre-rewrite descriptor state, then re-apply the umbrella bump
///
/// A failed reset is fatal: the tree may hold a mix of rewritten and original
/// descriptors and is surfaced to the operator, not retried.
pub fn reconcile(
  ctx: &ReleaseContext,
  dirs: &[PathBuf],
  plan: &VersionPlan,
  channel: &ReleaseChannel,
) -> ReleaseResult<()> {
  ctx
    .git
    .discard_worktree_changes()
    .map_err(|e| ReleaseError::Reset { stderr: e.to_string() })?;
  println!("♻️  Restored working tree to pre-rewrite state");

  // Names are back to their suffixed form, so match the umbrella by name
  let mut umbrella_dirs = Vec::new();
  for dir in dirs {
    let manifest = PackageManifest::read(dir)?;
    if manifest.name() == ctx.config.umbrella {
      umbrella_dirs.push(dir.clone());
    }
  }

  rewrite_packages(&umbrella_dirs, plan, channel, &RewriteOptions::version_only())?;

  if let Some(version) = plan.get(&ctx.config.umbrella) {
    println!("🔖 Re-applied {} v{}", ctx.config.umbrella, version);
  }

  Ok(())
}

/// Stage descriptors plus the lock file, commit, and push without hooks
///
/// Failure here never rolls back the publish: the artifacts already stand on
/// the registry, so the error is reported for manual follow-up instead.
pub fn commit_and_push(
  ctx: &ReleaseContext,
  dirs: &[PathBuf],
  plan: &VersionPlan,
  channel: &ReleaseChannel,
) -> ReleaseResult<()> {
  let result = (|| -> ReleaseResult<()> {
    let mut paths: Vec<PathBuf> = dirs.iter().map(|d| d.join(MANIFEST_FILENAME)).collect();
    let lockfile = ctx.root.join(&ctx.config.lockfile);
    if lockfile.exists() {
      paths.push(lockfile);
    }
    ctx.git.stage(&paths)?;

    let version = plan.get(&ctx.config.umbrella).ok_or_else(|| {
      ReleaseError::message(format!(
        "Umbrella package '{}' has no planned version",
        ctx.config.umbrella
      ))
    })?;
    let message = format!("Publish {} v{}", channel.strip(&ctx.config.umbrella), version);
    ctx.git.commit(&message)?;

    let branch = ctx.git.current_branch()?;
    println!("⬆️  Pushing {} upstream", branch);
    ctx.git.push_no_verify(&branch)?;
    Ok(())
  })();

  result.map_err(|e| ReleaseError::CommitOrPush { stderr: e.to_string() })
}
