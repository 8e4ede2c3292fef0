//! End-to-end tests for the release workflow

#![cfg(unix)]

use crate::helpers::{TestWorkspace, git, run_channel_release};
use anyhow::Result;

#[test]
fn test_dry_run_publishes_and_restores_tree() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_channel_release(&ws.path, &["--dry-run"], "y\ny\n")?;
  assert!(
    output.status.success(),
    "dry run should exit 0\nstdout: {}\nstderr: {}",
    String::from_utf8_lossy(&output.stdout),
    String::from_utf8_lossy(&output.stderr)
  );

  // One publish per package, every invocation carrying the dry-run flag
  let invocations = ws.registry_invocations();
  assert_eq!(invocations.len(), 3);
  for line in &invocations {
    assert!(line.starts_with("publish "), "unexpected invocation: {line}");
    assert!(line.contains("--access public"));
    assert!(line.contains("--tag exp"));
    assert!(line.contains("--dry-run"));
  }
  assert!(invocations[0].contains("/a "));
  assert!(invocations[2].contains("/umbrella "));

  // Reconciliation restores everything except the umbrella version bump
  let umbrella = ws.read_manifest("packages-exp/umbrella")?;
  assert_eq!(umbrella["name"], "firebase-exp");
  assert_eq!(umbrella["version"], "1.2.4");
  assert_eq!(umbrella["private"], true);

  let a = ws.read_manifest("packages-exp/a")?;
  assert_eq!(a["name"], "@x/a-exp");
  assert_eq!(a["version"], "0.5.0");
  assert_eq!(a["dependencies"]["@x/b-exp"], "^0.5.0");

  // Dry runs never commit
  let log = git(&ws.path, &["log", "--format=%s"])?;
  let subjects = String::from_utf8_lossy(&log.stdout);
  assert_eq!(subjects.lines().count(), 1);

  Ok(())
}

#[test]
fn test_declined_publish_gate_exits_nonzero() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_channel_release(&ws.path, &["--dry-run"], "n\n")?;
  assert_eq!(output.status.code(), Some(1));

  // Nothing published, nothing rewritten
  assert!(ws.registry_invocations().is_empty());
  let umbrella = ws.read_manifest("packages-exp/umbrella")?;
  assert_eq!(umbrella["name"], "firebase-exp");
  assert_eq!(umbrella["version"], "1.2.3");

  Ok(())
}

#[test]
fn test_declined_reset_gate_exits_clean_with_rewritten_tree() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_channel_release(&ws.path, &["--dry-run"], "y\nn\n")?;
  assert!(
    output.status.success(),
    "declining the reset gate is a clean exit\nstderr: {}",
    String::from_utf8_lossy(&output.stderr)
  );

  // The tree is intentionally left in its published shape for inspection
  let umbrella = ws.read_manifest("packages-exp/umbrella")?;
  assert_eq!(umbrella["name"], "firebase");
  assert_eq!(umbrella["version"], "1.2.4");
  assert!(umbrella.get("private").is_none());

  let a = ws.read_manifest("packages-exp/a")?;
  assert_eq!(a["name"], "@x/a");
  assert!(
    a["version"].as_str().unwrap().starts_with("0.5.0-exp."),
    "channel version expected, got {}",
    a["version"]
  );

  Ok(())
}

#[test]
fn test_full_release_commits_and_pushes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let remote = ws.with_origin()?;

  let output = run_channel_release(&ws.path, &[], "y\ny\ny\n")?;
  assert!(
    output.status.success(),
    "full release should exit 0\nstdout: {}\nstderr: {}",
    String::from_utf8_lossy(&output.stdout),
    String::from_utf8_lossy(&output.stderr)
  );

  let invocations = ws.registry_invocations();
  assert_eq!(invocations.len(), 3);
  for line in &invocations {
    assert!(!line.contains("--dry-run"));
  }

  // The version bump commit landed on the remote
  let log = git(&remote, &["log", "-1", "--format=%s", "main"])?;
  let subject = String::from_utf8_lossy(&log.stdout);
  assert_eq!(subject.trim(), "Publish firebase v1.2.4");

  // Only the umbrella version survives reconciliation
  let umbrella = ws.read_manifest("packages-exp/umbrella")?;
  assert_eq!(umbrella["name"], "firebase-exp");
  assert_eq!(umbrella["version"], "1.2.4");

  Ok(())
}
