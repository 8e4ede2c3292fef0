//! Error types for channel-release with contextual messages
//!
//! This module provides a unified error type that categorizes release failures
//! and attaches a contextual help message where one exists. Everything fatal is
//! caught once at the top of `main` and converted to exit code 1; per-package
//! publish failures are deliberately NOT errors (see `release::publish`), they
//! are aggregated outcomes the workflow carries forward.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for channel-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Package descriptor errors (missing or unparseable package.json)
  Descriptor(DescriptorError),

  /// A package's current version is not a valid semantic version
  InvalidVersion {
    package: String,
    version: String,
    reason: String,
  },

  /// A build stage exited nonzero (fail-fast, aborts the workflow)
  Build {
    stage: String,
    command: String,
    stderr: String,
  },

  /// Git operation errors
  Git(GitError),

  /// Operator declined the version confirmation gate before publish
  ConfirmationDeclined,

  /// Discarding working-tree changes failed; tree state is ambiguous
  Reset { stderr: String },

  /// Post-publish commit or push failed (published artifacts stand)
  CommitOrPush { stderr: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Descriptor(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::InvalidVersion { package, .. } => Some(format!(
        "Fix the `version` field in {}'s package.json so it parses as semver (e.g. \"1.2.3\").",
        package
      )),
      ReleaseError::Build { stage, .. } => Some(format!(
        "Run the '{}' stage's build target manually to reproduce the failure. Nothing was published.",
        stage
      )),
      ReleaseError::Reset { .. } => Some(
        "The working tree may hold a mix of rewritten and original descriptors. Inspect `git status` and restore manually before rerunning."
          .to_string(),
      ),
      ReleaseError::CommitOrPush { .. } => {
        Some("The registry publish already completed. Commit and push the version bump manually.".to_string())
      }
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Descriptor(e) => write!(f, "{}", e),
      ReleaseError::InvalidVersion {
        package,
        version,
        reason,
      } => {
        write!(f, "Package '{}' has invalid version '{}': {}", package, version, reason)
      }
      ReleaseError::Build { stage, command, stderr } => {
        write!(f, "Build stage '{}' failed: {}\n{}", stage, command, stderr)
      }
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::ConfirmationDeclined => {
        write!(f, "Release aborted: planned versions were not confirmed")
      }
      ReleaseError::Reset { stderr } => {
        write!(f, "Failed to discard working-tree changes:\n{}", stderr)
      }
      ReleaseError::CommitOrPush { stderr } => {
        write!(f, "Post-publish commit/push failed:\n{}", stderr)
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<anyhow::Error> for ReleaseError {
  fn from(err: anyhow::Error) -> Self {
    ReleaseError::message(err.to_string())
  }
}

/// Package descriptor errors
#[derive(Debug)]
pub enum DescriptorError {
  /// No package.json at the package directory
  NotFound { path: PathBuf },

  /// package.json exists but is not parseable structured data
  Malformed { path: PathBuf, reason: String },
}

impl DescriptorError {
  fn help_message(&self) -> Option<String> {
    match self {
      DescriptorError::NotFound { path } => Some(format!(
        "Check the `packages` patterns in release.toml; no descriptor exists at {}",
        path.display()
      )),
      DescriptorError::Malformed { .. } => None,
    }
  }
}

impl fmt::Display for DescriptorError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DescriptorError::NotFound { path } => {
        write!(f, "Package descriptor not found: {}", path.display())
      }
      DescriptorError::Malformed { path, reason } => {
        write!(f, "Malformed package descriptor {}: {}", path.display(), reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { branch: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first, then push the version bump manually.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "channel-release must run inside a git checkout; no repository found at {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { branch, reason } => {
        write!(f, "Push of branch '{}' failed: {}", branch, reason)
      }
    }
  }
}

/// Result type alias for channel-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
