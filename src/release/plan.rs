//! Version planning for one release run
//!
//! The umbrella package gets a plain patch bump so its version stays
//! comparable release-over-release. Every other package gets a prerelease of
//! the form `<major.minor.patch>-<channel>.<build-id>`: unique and traceable
//! per run, which is all a package needs when nothing outside the channel
//! depends on it. The current version is normalized to its release core
//! first, so a prerelease or build suffix already present is replaced by the
//! channel identifier, never stacked under it. Rerunning with the same
//! revision reproduces the same plan.

use crate::core::error::{ReleaseError, ReleaseResult};
use crate::manifest::PackageManifest;
use crate::release::ReleaseChannel;
use semver::{Prerelease, Version};
use std::collections::BTreeMap;

/// Immutable mapping from package name (original, channel-suffixed) to the
/// version it receives in this run. Built once, consumed by the rewriter,
/// the publisher, and the reconciler.
#[derive(Debug, Clone)]
pub struct VersionPlan {
  entries: BTreeMap<String, Version>,
}

impl VersionPlan {
  /// Planned version for a package, if the package is in the working set
  pub fn get(&self, package: &str) -> Option<&Version> {
    self.entries.get(package)
  }

  /// Number of planned packages
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate entries in name order
  pub fn iter(&self) -> impl Iterator<Item = (&String, &Version)> {
    self.entries.iter()
  }
}

/// Compute the next version for every package in the working set
pub fn plan_versions(
  manifests: &[PackageManifest],
  umbrella: &str,
  channel: &ReleaseChannel,
  build_id: &str,
) -> ReleaseResult<VersionPlan> {
  let mut entries = BTreeMap::new();
  let mut saw_umbrella = false;

  for manifest in manifests {
    let name = manifest.name();
    let current = Version::parse(manifest.version()).map_err(|e| ReleaseError::InvalidVersion {
      package: name.to_string(),
      version: manifest.version().to_string(),
      reason: e.to_string(),
    })?;

    let next = if name == umbrella {
      saw_umbrella = true;
      Version::new(current.major, current.minor, current.patch + 1)
    } else {
      let mut next = Version::new(current.major, current.minor, current.patch);
      next.pre = Prerelease::new(&format!("{}.{}", channel.tag(), build_id)).map_err(|e| {
        ReleaseError::message(format!(
          "Cannot form prerelease '{}.{}' for package '{}': {}",
          channel.tag(),
          build_id,
          name,
          e
        ))
      })?;
      next
    };

    if entries.insert(name.to_string(), next).is_some() {
      return Err(ReleaseError::message(format!(
        "Duplicate package name '{}' in the working set",
        name
      )));
    }
  }

  if !saw_umbrella {
    return Err(ReleaseError::with_help(
      format!("Umbrella package '{}' is not in the working set", umbrella),
      "Check `umbrella` and `packages` in release.toml",
    ));
  }

  Ok(VersionPlan { entries })
}
