//! Release configuration (release.toml) parsing and validation
//!
//! One release channel per configuration file. The config names the channel
//! tag, the umbrella package, the package path patterns making up the working
//! set, and the external collaborators (build runner, registry client).

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for channel-release
/// Searched in order: release.toml, .release.toml, .config/release.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Release channel tag: name suffix marker, prerelease identifier, and
  /// registry distribution tag (e.g. "exp")
  pub channel: String,

  /// Development name of the umbrella package (channel-suffixed), the only
  /// package whose version stays stable/orderable across releases
  pub umbrella: String,

  /// Package directory patterns relative to the repository root.
  /// A trailing `/*` scans one directory level for package descriptors.
  pub packages: Vec<String>,

  /// Dependency lock file staged alongside descriptors on commit
  #[serde(default = "default_lockfile")]
  pub lockfile: String,

  pub build: BuildConfig,

  #[serde(default)]
  pub registry: RegistryConfig,
}

fn default_lockfile() -> String {
  "package-lock.json".to_string()
}

/// External build runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
  /// Build runner program (e.g. "yarn", "npx")
  pub program: String,

  /// Arguments placed before the build target (e.g. ["lerna", "run"])
  #[serde(default)]
  pub args: Vec<String>,

  /// Stale build output of a non-channel sibling package, deleted before the
  /// final stage so channel-layer consumers resolve the right artifact
  #[serde(default)]
  pub stale_output: Option<PathBuf>,

  /// Ordered build stages; order encodes real dependency edges
  pub stages: Vec<BuildStage>,
}

/// One scoped build stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStage {
  /// Stage name, used in progress output and build failure reports
  pub name: String,

  /// Package-name scopes passed to the runner
  pub scopes: Vec<String>,

  /// Build target invoked for the scopes
  pub target: String,

  /// Optional target run before `target` for the same scopes
  #[serde(default)]
  pub pre_target: Option<String>,
}

/// Registry client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
  /// Registry client program
  #[serde(default = "default_registry_program")]
  pub program: String,

  /// Extra arguments appended to every publish invocation
  #[serde(default)]
  pub args: Vec<String>,
}

fn default_registry_program() -> String {
  "npm".to_string()
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      program: default_registry_program(),
      args: Vec::new(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from release.toml (searches multiple locations)
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ReleaseError::with_help(
        format!("No release configuration found under {}", path.display()),
        "Create a release.toml naming the channel, umbrella package, package patterns, and build stages.",
      )
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ReleaseConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid release configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Validate the release configuration
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.channel.is_empty() || self.channel.contains(char::is_whitespace) {
      return Err(ReleaseError::message(format!(
        "Invalid channel tag '{}': must be a nonempty token without whitespace",
        self.channel
      )));
    }

    if self.umbrella.is_empty() {
      return Err(ReleaseError::message("Missing umbrella package name"));
    }

    if self.packages.is_empty() {
      return Err(ReleaseError::with_help(
        "No package patterns configured",
        "Add at least one entry to `packages` in release.toml",
      ));
    }

    if self.build.stages.is_empty() {
      return Err(ReleaseError::with_help(
        "No build stages configured",
        "Add at least one [[build.stages]] entry in dependency order",
      ));
    }

    for stage in &self.build.stages {
      if stage.scopes.is_empty() {
        return Err(ReleaseError::message(format!(
          "Build stage '{}' names no package scopes",
          stage.name
        )));
      }
      if stage.target.is_empty() {
        return Err(ReleaseError::message(format!(
          "Build stage '{}' names no build target",
          stage.name
        )));
      }
    }

    Ok(())
  }
}
