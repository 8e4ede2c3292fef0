//! System git backend - zero dependencies
//!
//! Uses git plumbing commands for the handful of operations the release
//! workflow consumes: revision lookup, branch lookup, working-tree restore,
//! staging, commit, and hook-free push. All calls are blocking subprocesses
//! with an isolated environment.

use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
///
/// Every command runs against the working tree root, not the directory the
/// process was invoked from, so tree-wide operations cover the whole
/// repository regardless of the invocation directory.
#[derive(Debug)]
pub struct SystemGit {
  /// Working tree root
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ReleaseError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ReleaseError::message(format!(
        "Failed to open git repository: {}",
        stderr
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Short identifier of the current revision (used as the build id)
  pub fn short_head(&self) -> ReleaseResult<String> {
    self.run(&["rev-parse", "--short", "HEAD"])
  }

  /// Get current branch name
  pub fn current_branch(&self) -> ReleaseResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Discard every uncommitted change in the working tree
  ///
  /// Hard restore, not a selective undo: the descriptor rewrite is not cleanly
  /// invertible, so the pre-rewrite state comes back from version control.
  pub fn discard_worktree_changes(&self) -> ReleaseResult<()> {
    self.run(&["checkout", "--", "."]).map(|_| ())
  }

  /// Stage the given paths (relative to the working tree root)
  pub fn stage(&self, paths: &[PathBuf]) -> ReleaseResult<()> {
    let mut args: Vec<&str> = vec!["add", "--"];
    let rendered: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    args.extend(rendered.iter().map(|s| s.as_str()));
    self.run(&args).map(|_| ())
  }

  /// Commit staged changes with the given message
  pub fn commit(&self, message: &str) -> ReleaseResult<()> {
    self.run(&["commit", "-m", message]).map(|_| ())
  }

  /// Push a branch upstream without triggering pre-push hooks
  pub fn push_no_verify(&self, branch: &str) -> ReleaseResult<()> {
    let output = self
      .git_cmd()
      .args(["push", "origin", branch, "--no-verify"])
      .output()
      .context("Failed to execute git push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::Git(GitError::PushFailed {
        branch: branch.to_string(),
        reason: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Run a git command, returning trimmed stdout on success
  fn run(&self, args: &[&str]) -> ReleaseResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree root
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
