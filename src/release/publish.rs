//! Registry publishing under the channel distribution tag
//!
//! Publishes run sequentially but failures are isolated per package: the one
//! irreversible step is the registry publish, and isolating failures lets the
//! operator retry only the failed subset instead of re-running version bumps.
//! Outcomes are reported in input order.

use crate::core::config::RegistryConfig;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::manifest::PackageManifest;
use crate::release::ReleaseChannel;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of one package's publish invocation
#[derive(Debug)]
pub struct PublishOutcome {
  /// Registry-facing package name (post-rewrite)
  pub package: String,

  /// Version that was published (or attempted)
  pub version: String,

  /// Registry client stderr when the invocation failed
  pub error: Option<String>,
}

impl PublishOutcome {
  pub fn succeeded(&self) -> bool {
    self.error.is_none()
  }
}

/// Aggregate result of the publish phase, outcomes in input order
#[derive(Debug)]
pub struct PublishReport {
  pub outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
  pub fn failed(&self) -> Vec<&PublishOutcome> {
    self.outcomes.iter().filter(|o| !o.succeeded()).collect()
  }

  pub fn all_succeeded(&self) -> bool {
    self.outcomes.iter().all(|o| o.succeeded())
  }
}

/// Publish every package's build artifact under the channel tag
///
/// Continue-on-error: a failed invocation is recorded and the remaining
/// packages are still attempted. The report never aborts the workflow; the
/// operator decides what to do with partial failures.
pub fn publish_packages(
  root: &Path,
  dirs: &[PathBuf],
  channel: &ReleaseChannel,
  registry: &RegistryConfig,
  dry_run: bool,
) -> ReleaseResult<PublishReport> {
  let mut outcomes = Vec::with_capacity(dirs.len());

  for (idx, dir) in dirs.iter().enumerate() {
    let manifest = PackageManifest::read(dir)?;
    let package = manifest.name().to_string();
    let version = manifest.version().to_string();

    println!("📌 [{}/{}] Publishing {} v{}", idx + 1, dirs.len(), package, version);

    let mut cmd = Command::new(&registry.program);
    cmd.current_dir(root);
    cmd.arg("publish");
    cmd.arg(dir);
    cmd.args(["--access", "public", "--tag", channel.tag()]);
    cmd.args(&registry.args);
    if dry_run {
      cmd.arg("--dry-run");
    }

    let output = cmd
      .output()
      .with_context(|| format!("Failed to execute registry client '{}'", registry.program))?;

    let error = if output.status.success() {
      println!("   ✅ Published {} v{}", package, version);
      None
    } else {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
      println!("   ❌ Publish of {} failed (continuing with remaining packages)", package);
      Some(stderr)
    };

    outcomes.push(PublishOutcome {
      package,
      version,
      error,
    });
  }

  Ok(PublishReport { outcomes })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn write_pkg(root: &Path, dir: &str, name: &str, version: &str) -> PathBuf {
    let pkg_dir = root.join(dir);
    fs::create_dir_all(&pkg_dir).unwrap();
    fs::write(
      pkg_dir.join("package.json"),
      format!(r#"{{"name": "{}", "version": "{}"}}"#, name, version),
    )
    .unwrap();
    pkg_dir
  }

  #[cfg(unix)]
  fn stub_registry(dir: &Path, log: &Path, fail_on: &str) -> RegistryConfig {
    use std::os::unix::fs::PermissionsExt;
    let script = dir.join("registry.sh");
    // the pattern is quoted so fail_on may contain spaces
    fs::write(
      &script,
      format!(
        "#!/bin/sh\necho \"$@\" >> {}\ncase \"$*\" in *\"{}\"*) exit 1;; esac\n",
        log.display(),
        fail_on
      ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    RegistryConfig {
      program: script.display().to_string(),
      args: vec![],
    }
  }

  #[cfg(unix)]
  #[test]
  fn test_failure_is_isolated_and_order_preserved() {
    let root = TempDir::new().unwrap();
    let a = write_pkg(root.path(), "a", "@x/a", "0.5.0-exp.abcdef");
    let b = write_pkg(root.path(), "b", "@x/b", "0.5.0-exp.abcdef");
    let log = root.path().join("registry.log");
    let registry = stub_registry(root.path(), &log, "/a ");

    let report = publish_packages(
      root.path(),
      &[a, b],
      &ReleaseChannel::new("exp"),
      &registry,
      false,
    )
    .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].package, "@x/a");
    assert!(!report.outcomes[0].succeeded());
    assert_eq!(report.outcomes[1].package, "@x/b");
    assert!(report.outcomes[1].succeeded());
    assert_eq!(report.failed().len(), 1);

    // both invocations happened despite the first failing
    let lines: Vec<String> = fs::read_to_string(&log).unwrap().lines().map(String::from).collect();
    assert_eq!(lines.len(), 2);
  }

  #[cfg(unix)]
  #[test]
  fn test_dry_run_flag_present_for_every_package() {
    let root = TempDir::new().unwrap();
    let a = write_pkg(root.path(), "a", "@x/a", "0.5.0-exp.abcdef");
    let b = write_pkg(root.path(), "b", "@x/b", "0.5.0-exp.abcdef");
    let log = root.path().join("registry.log");
    let registry = stub_registry(root.path(), &log, "never-matches");

    let report = publish_packages(
      root.path(),
      &[a, b],
      &ReleaseChannel::new("exp"),
      &registry,
      true,
    )
    .unwrap();

    assert!(report.all_succeeded());
    let content = fs::read_to_string(&log).unwrap();
    for line in content.lines() {
      assert!(line.contains("--dry-run"));
      assert!(line.contains("--tag exp"));
      assert!(line.contains("--access public"));
    }
  }
}
