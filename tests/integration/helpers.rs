//! Test helpers for integration tests

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// A test repository holding a channel package set, stub collaborators, and
/// a release.toml wired to them
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  pub registry_log: PathBuf,
}

impl TestWorkspace {
  /// Create a committed repository with an umbrella package plus two channel
  /// packages, a logging stub registry, and a no-op build runner
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    add_package(
      &path,
      "packages-exp/umbrella",
      r#"{
  "name": "firebase-exp",
  "version": "1.2.3",
  "private": true
}
"#,
    )?;
    add_package(
      &path,
      "packages-exp/a",
      r#"{
  "name": "@x/a-exp",
  "version": "0.5.0",
  "private": true,
  "dependencies": {
    "@x/b-exp": "^0.5.0"
  },
  "devDependencies": {
    "@x/b-exp": "^0.5.0"
  }
}
"#,
    )?;
    add_package(
      &path,
      "packages-exp/b",
      r#"{
  "name": "@x/b-exp",
  "version": "0.5.0",
  "private": true
}
"#,
    )?;

    let registry_log = path.join("registry.log");
    let registry_program = write_stub_script(
      &path,
      "registry.sh",
      &format!("#!/bin/sh\necho \"$@\" >> {}\n", registry_log.display()),
    )?;

    std::fs::write(
      path.join("release.toml"),
      format!(
        r#"channel = "exp"
umbrella = "firebase-exp"
packages = ["packages-exp/*"]

[build]
program = "true"

[[build.stages]]
name = "all"
scopes = ["firebase-exp"]
target = "build"

[registry]
program = "{}"
"#,
        registry_program.display()
      ),
    )?;
    std::fs::write(path.join("package-lock.json"), "{}\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial package set"])?;

    Ok(Self {
      _root: root,
      path,
      registry_log,
    })
  }

  /// Add a bare origin remote so pushes succeed
  pub fn with_origin(&self) -> Result<PathBuf> {
    let remote = self.path.join("origin.git");
    let output = Command::new("git")
      .args(["init", "--bare"])
      .arg(&remote)
      .output()
      .context("Failed to init bare remote")?;
    anyhow::ensure!(output.status.success(), "git init --bare failed");
    git(&self.path, &["remote", "add", "origin", remote.to_str().unwrap()])?;
    Ok(remote)
  }

  /// Read a descriptor back as JSON
  pub fn read_manifest(&self, dir: &str) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(self.path.join(dir).join("package.json"))?;
    Ok(serde_json::from_str(&content)?)
  }

  /// Lines logged by the stub registry, one per publish invocation
  pub fn registry_invocations(&self) -> Vec<String> {
    std::fs::read_to_string(&self.registry_log)
      .map(|content| content.lines().map(String::from).collect())
      .unwrap_or_default()
  }
}

fn add_package(root: &Path, dir: &str, manifest: &str) -> Result<()> {
  let pkg_dir = root.join(dir);
  std::fs::create_dir_all(&pkg_dir)?;
  std::fs::write(pkg_dir.join("package.json"), manifest)?;
  Ok(())
}

#[cfg(unix)]
fn write_stub_script(root: &Path, name: &str, content: &str) -> Result<PathBuf> {
  use std::os::unix::fs::PermissionsExt;
  let script = root.join(name);
  std::fs::write(&script, content)?;
  std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
  Ok(script)
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the channel-release binary, feeding confirmation answers via stdin.
/// Returns the raw output so tests can assert on exit codes.
pub fn run_channel_release(cwd: &Path, args: &[&str], stdin_input: &str) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_channel-release");

  let mut child = Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to spawn channel-release")?;

  child
    .stdin
    .as_mut()
    .context("Missing stdin handle")?
    .write_all(stdin_input.as_bytes())?;

  Ok(child.wait_with_output()?)
}
