//! Package descriptor accessor
//!
//! Reads and writes a package's `package.json`. The document is held as a raw
//! JSON object (key order preserved) so that unknown fields pass through
//! untouched and a full-file rewrite produces a minimal version-control diff:
//! stable key ordering, pretty printing, trailing newline.
//!
//! This component keeps no backups; restoring pre-rewrite state is the
//! reconciler's job via version control.

use crate::core::error::{DescriptorError, ReleaseError, ReleaseResult, ResultExt};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Descriptor file name, one per package directory
pub const MANIFEST_FILENAME: &str = "package.json";

/// In-memory snapshot of one package descriptor
///
/// Transient by design: read at the start of a phase, written (full-file
/// replace) or discarded at its end. Never merged.
#[derive(Debug)]
pub struct PackageManifest {
  /// Package directory (descriptor identity)
  dir: PathBuf,

  /// Full descriptor document, key order preserved
  doc: Map<String, Value>,
}

impl PackageManifest {
  /// Read the descriptor at `<dir>/package.json`
  pub fn read(dir: &Path) -> ReleaseResult<Self> {
    let path = dir.join(MANIFEST_FILENAME);
    if !path.exists() {
      return Err(ReleaseError::Descriptor(DescriptorError::NotFound { path }));
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
      ReleaseError::Descriptor(DescriptorError::Malformed {
        path: path.clone(),
        reason: e.to_string(),
      })
    })?;

    let doc = match value {
      Value::Object(map) => map,
      _ => {
        return Err(ReleaseError::Descriptor(DescriptorError::Malformed {
          path,
          reason: "top-level value is not an object".to_string(),
        }));
      }
    };

    for field in ["name", "version"] {
      if !matches!(doc.get(field), Some(Value::String(_))) {
        return Err(ReleaseError::Descriptor(DescriptorError::Malformed {
          path,
          reason: format!("missing or non-string `{}` field", field),
        }));
      }
    }

    Ok(Self {
      dir: dir.to_path_buf(),
      doc,
    })
  }

  /// Write the descriptor back as a full-file replace
  ///
  /// Pretty-printed with the original key order and a trailing newline.
  pub fn write(&self) -> ReleaseResult<()> {
    let path = self.manifest_path();
    let mut rendered = serde_json::to_string_pretty(&Value::Object(self.doc.clone()))
      .map_err(|e| ReleaseError::message(format!("Failed to serialize {}: {}", path.display(), e)))?;
    rendered.push('\n');

    fs::write(&path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
  }

  /// Path to the descriptor file
  pub fn manifest_path(&self) -> PathBuf {
    self.dir.join(MANIFEST_FILENAME)
  }

  /// Package name
  pub fn name(&self) -> &str {
    match self.doc.get("name") {
      Some(Value::String(s)) => s,
      _ => unreachable!("validated on read"),
    }
  }

  /// Package version string
  pub fn version(&self) -> &str {
    match self.doc.get("version") {
      Some(Value::String(s)) => s,
      _ => unreachable!("validated on read"),
    }
  }

  /// Whether the package is marked private
  pub fn is_private(&self) -> bool {
    matches!(self.doc.get("private"), Some(Value::Bool(true)))
  }

  /// Rename the package (updates in place, key position unchanged)
  pub fn set_name(&mut self, name: &str) {
    self.doc.insert("name".to_string(), Value::String(name.to_string()));
  }

  /// Set the package version
  pub fn set_version(&mut self, version: &str) {
    self.doc.insert("version".to_string(), Value::String(version.to_string()));
  }

  /// Drop the private flag so the registry accepts the package
  pub fn clear_private(&mut self) {
    self.doc.remove("private");
  }

  /// Rewrite `dependencies` and `peerDependencies` entries in place.
  ///
  /// The closure receives each (name, range) pair and returns the replacement
  /// pair, or `None` to keep the entry untouched. Entry order is preserved.
  /// `devDependencies` are never visited: they are irrelevant to consumers of
  /// the published artifact.
  pub fn rewrite_runtime_dependencies<F>(&mut self, mut f: F)
  where
    F: FnMut(&str, &str) -> Option<(String, String)>,
  {
    for section in RUNTIME_DEP_SECTIONS {
      let Some(Value::Object(map)) = self.doc.get(section) else {
        continue;
      };

      let mut rewritten = Map::new();
      for (name, range) in map {
        match range {
          Value::String(range_str) => match f(name, range_str) {
            Some((new_name, new_range)) => {
              rewritten.insert(new_name, Value::String(new_range));
            }
            None => {
              rewritten.insert(name.clone(), range.clone());
            }
          },
          other => {
            rewritten.insert(name.clone(), other.clone());
          }
        }
      }

      self.doc.insert(section.to_string(), Value::Object(rewritten));
    }
  }
}

const RUNTIME_DEP_SECTIONS: [&str; 2] = ["dependencies", "peerDependencies"];

/// Expand configured package patterns into package directories.
///
/// A pattern ending in `/*` scans one directory level and keeps entries that
/// hold a descriptor; any other pattern must itself be a package directory.
/// Results are sorted for deterministic working-set order.
pub fn discover_package_dirs(root: &Path, patterns: &[String]) -> ReleaseResult<Vec<PathBuf>> {
  let mut dirs = Vec::new();

  for pattern in patterns {
    if let Some(base) = pattern.strip_suffix("/*") {
      let scan_dir = root.join(base);
      if !scan_dir.is_dir() {
        return Err(ReleaseError::message(format!(
          "Package pattern '{}' does not match a directory",
          pattern
        )));
      }

      let mut matched = Vec::new();
      for entry in fs::read_dir(&scan_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join(MANIFEST_FILENAME).exists() {
          matched.push(path);
        }
      }
      matched.sort();
      dirs.extend(matched);
    } else {
      let dir = root.join(pattern);
      if !dir.join(MANIFEST_FILENAME).exists() {
        return Err(ReleaseError::Descriptor(DescriptorError::NotFound {
          path: dir.join(MANIFEST_FILENAME),
        }));
      }
      dirs.push(dir);
    }
  }

  Ok(dirs)
}
