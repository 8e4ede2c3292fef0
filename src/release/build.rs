//! Dependency-ordered builds through an external build runner
//!
//! Stages run strictly in the configured order: later stages read artifacts
//! produced by earlier ones. Any nonzero exit aborts the whole workflow
//! immediately; a failed build cannot safely be published, so there is no
//! continue-on-error here (contrast with the publisher).

use crate::core::config::{BuildConfig, BuildStage};
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::path::Path;
use std::process::Command;

/// Run every configured build stage in order (fail-fast)
///
/// Before the final stage, the configured stale output directory of a
/// non-channel sibling package is deleted; its presence would make
/// channel-layer consumers resolve against the wrong artifact.
pub fn run_build(root: &Path, build: &BuildConfig) -> ReleaseResult<()> {
  let total = build.stages.len();

  for (idx, stage) in build.stages.iter().enumerate() {
    let is_final = idx + 1 == total;
    if is_final && let Some(stale) = &build.stale_output {
      let stale_path = root.join(stale);
      if stale_path.exists() {
        println!("🧹 Removing stale build output {}", stale.display());
        std::fs::remove_dir_all(&stale_path)
          .with_context(|| format!("Failed to remove stale output {}", stale_path.display()))?;
      }
    }

    println!("🔨 [{}/{}] Building stage '{}'", idx + 1, total, stage.name);

    if let Some(pre_target) = &stage.pre_target {
      run_stage_target(root, build, stage, pre_target)?;
    }
    run_stage_target(root, build, stage, &stage.target)?;
  }

  Ok(())
}

/// One scoped runner invocation: `<program> <args..> <target> --scope <s>...`
fn run_stage_target(root: &Path, build: &BuildConfig, stage: &BuildStage, target: &str) -> ReleaseResult<()> {
  let mut cmd = Command::new(&build.program);
  cmd.current_dir(root);
  cmd.args(&build.args);
  cmd.arg(target);
  for scope in &stage.scopes {
    cmd.args(["--scope", scope]);
  }

  let rendered = render_command(build, stage, target);
  let output = cmd
    .output()
    .with_context(|| format!("Failed to execute build runner: {}", rendered))?;

  if !output.status.success() {
    return Err(ReleaseError::Build {
      stage: stage.name.clone(),
      command: rendered,
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }

  Ok(())
}

fn render_command(build: &BuildConfig, stage: &BuildStage, target: &str) -> String {
  let mut parts = vec![build.program.clone()];
  parts.extend(build.args.iter().cloned());
  parts.push(target.to_string());
  for scope in &stage.scopes {
    parts.push("--scope".to_string());
    parts.push(scope.clone());
  }
  parts.join(" ")
}
