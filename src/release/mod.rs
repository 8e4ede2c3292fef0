//! Release engine: version planning, staged builds, descriptor rewriting,
//! registry publishing, repository reconciliation, and the workflow state
//! machine that sequences them.

pub mod build;
pub mod plan;
pub mod publish;
pub mod reconcile;
pub mod rewrite;
pub mod workflow;

/// Release channel tag
///
/// One token serving three roles: the `-<tag>` suffix marking development
/// package names, the prerelease identifier in planned versions, and the
/// registry distribution tag at publish time.
///
/// Stripping is one-way. The original name is never reconstructed from the
/// stripped form (ambiguous when the base name itself contains the token);
/// reconciliation restores names via version-control checkout instead.
#[derive(Debug, Clone)]
pub struct ReleaseChannel {
  tag: String,
}

impl ReleaseChannel {
  pub fn new(tag: impl Into<String>) -> Self {
    Self { tag: tag.into() }
  }

  /// Channel token (e.g. "exp")
  pub fn tag(&self) -> &str {
    &self.tag
  }

  /// Name suffix marker (e.g. "-exp")
  pub fn suffix(&self) -> String {
    format!("-{}", self.tag)
  }

  /// Strip the channel suffix from a package name.
  ///
  /// Identity on names that do not end with the suffix.
  pub fn strip<'a>(&self, name: &'a str) -> &'a str {
    name.strip_suffix(self.suffix().as_str()).unwrap_or(name)
  }

  /// Whether a name carries the channel suffix
  pub fn marks(&self, name: &str) -> bool {
    name.ends_with(self.suffix().as_str())
  }
}
