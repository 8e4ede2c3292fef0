//! Name/version rewriter for package descriptors
//!
//! Rewrites descriptors in place, always as a fresh snapshot write (read,
//! mutate, full-file replace), never a merge. Invoked twice per workflow with
//! opposite option sets: publish mode (strip suffix, apply planned versions,
//! make public) before the registry publish, and versions-only mode after the
//! worktree reset to re-apply just the umbrella bump.

use crate::core::error::ReleaseResult;
use crate::manifest::PackageManifest;
use crate::release::ReleaseChannel;
use crate::release::plan::VersionPlan;
use std::path::PathBuf;

/// What the rewrite pass touches
#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
  /// Strip the channel suffix from the package's own name and from every
  /// dependencies/peerDependencies key
  pub strip_channel_suffix: bool,

  /// Apply planned versions to the package and its planned dependencies
  pub update_versions: bool,

  /// Clear the private flag
  pub make_public: bool,
}

impl RewriteOptions {
  /// Registry-facing descriptors: strip, version, publicize
  pub fn publish_mode() -> Self {
    Self {
      strip_channel_suffix: true,
      update_versions: true,
      make_public: true,
    }
  }

  /// Post-reset re-apply: version only, names and visibility untouched
  pub fn version_only() -> Self {
    Self {
      strip_channel_suffix: false,
      update_versions: true,
      make_public: false,
    }
  }
}

/// Rewrite each package descriptor under `dirs` per the options
///
/// Dependencies present in the plan get their planned version; dependencies
/// outside the plan are treated as external and their declared ranges stay
/// untouched. `devDependencies` are never rewritten.
pub fn rewrite_packages(
  dirs: &[PathBuf],
  plan: &VersionPlan,
  channel: &ReleaseChannel,
  options: &RewriteOptions,
) -> ReleaseResult<()> {
  for dir in dirs {
    let mut manifest = PackageManifest::read(dir)?;
    let original_name = manifest.name().to_string();

    if options.update_versions
      && let Some(next) = plan.get(&original_name)
    {
      manifest.set_version(&next.to_string());
    }

    if options.strip_channel_suffix {
      let stripped = channel.strip(&original_name);
      if stripped != original_name {
        let stripped = stripped.to_string();
        manifest.set_name(&stripped);
      }

      manifest.rewrite_runtime_dependencies(|dep_name, declared_range| {
        let new_name = channel.strip(dep_name);
        let planned = plan.get(dep_name);
        if new_name == dep_name && planned.is_none() {
          return None; // external dependency, leave untouched
        }
        let new_range = planned
          .map(|v| v.to_string())
          .unwrap_or_else(|| declared_range.to_string());
        Some((new_name.to_string(), new_range))
      });
    }

    if options.make_public {
      manifest.clear_private();
    }

    manifest.write()?;
  }

  Ok(())
}
