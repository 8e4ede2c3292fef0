//! Release workflow controller
//!
//! An explicit state machine sequencing the release phases:
//!
//! ```text
//! Idle -> Preparing -> Building -> VersionPlanned -> AwaitingPublishConfirmation
//!      -> {Aborted | Publishing} -> AwaitingResetConfirmation -> {Exited | Resetting}
//!      -> AwaitingPushConfirmation (skipped if dry-run) -> {Done | Committing} -> Done
//! ```
//!
//! Any fatal error moves the run to `Failed`. Declining the publish gate
//! raises `ConfirmationDeclined` (caught at top level, exit 1); declining the
//! reset gate ends the run cleanly in `Exited` with the tree left mutated for
//! inspection. One workflow instance per invocation, no checkpointing: a
//! restarted run starts over from `Preparing`.

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult, print_error};
use crate::manifest::{PackageManifest, discover_package_dirs};
use crate::release::ReleaseChannel;
use crate::release::build::run_build;
use crate::release::plan::plan_versions;
use crate::release::publish::publish_packages;
use crate::release::reconcile::{commit_and_push, reconcile};
use crate::release::rewrite::{RewriteOptions, rewrite_packages};
use crate::ui::prompt::Prompter;

/// Workflow states; `Aborted`, `Exited`, `Done`, and `Failed` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
  Idle,
  Preparing,
  Building,
  VersionPlanned,
  AwaitingPublishConfirmation,
  Aborted,
  Publishing,
  AwaitingResetConfirmation,
  Exited,
  Resetting,
  AwaitingPushConfirmation,
  Committing,
  Done,
  Failed,
}

/// One in-process workflow run; never persisted across restarts
pub struct ReleaseWorkflow<'a> {
  ctx: &'a ReleaseContext,
  prompter: &'a mut dyn Prompter,
  state: WorkflowState,
}

impl<'a> ReleaseWorkflow<'a> {
  pub fn new(ctx: &'a ReleaseContext, prompter: &'a mut dyn Prompter) -> Self {
    Self {
      ctx,
      prompter,
      state: WorkflowState::Idle,
    }
  }

  /// Current workflow state
  pub fn state(&self) -> WorkflowState {
    self.state
  }

  /// Drive the workflow to a terminal state
  pub fn run(&mut self) -> ReleaseResult<WorkflowState> {
    match self.drive() {
      Ok(state) => Ok(state),
      Err(e) => {
        // A declined publish gate is a deliberate abort, not a failure
        if self.state != WorkflowState::Aborted {
          self.state = WorkflowState::Failed;
        }
        Err(e)
      }
    }
  }

  fn drive(&mut self) -> ReleaseResult<WorkflowState> {
    let ctx = self.ctx;
    let channel = ReleaseChannel::new(ctx.config.channel.clone());

    self.state = WorkflowState::Preparing;
    let dirs = discover_package_dirs(&ctx.root, &ctx.config.packages)?;
    let build_id = ctx.git.short_head()?;
    println!(
      "📦 Working set: {} packages (channel '{}', build {})",
      dirs.len(),
      channel.tag(),
      build_id
    );
    if ctx.dry_run {
      println!("🔍 Dry-run mode: registry publishes are simulated, nothing is committed");
    }

    self.state = WorkflowState::Building;
    run_build(&ctx.root, &ctx.config.build)?;

    self.state = WorkflowState::VersionPlanned;
    let manifests = dirs
      .iter()
      .map(|d| PackageManifest::read(d))
      .collect::<ReleaseResult<Vec<_>>>()?;
    let plan = plan_versions(&manifests, &ctx.config.umbrella, &channel, &build_id)?;
    println!("🗒️  Planned versions:");
    for (name, version) in plan.iter() {
      println!("   {} → {}", name, version);
    }

    self.state = WorkflowState::AwaitingPublishConfirmation;
    if !self.prompter.confirm("Publish these versions to the registry?")? {
      self.state = WorkflowState::Aborted;
      return Err(ReleaseError::ConfirmationDeclined);
    }

    self.state = WorkflowState::Publishing;
    rewrite_packages(&dirs, &plan, &channel, &RewriteOptions::publish_mode())?;
    let report = publish_packages(&ctx.root, &dirs, &channel, &ctx.config.registry, ctx.dry_run)?;
    if !report.all_succeeded() {
      eprintln!(
        "⚠️  {} of {} publishes failed; the failures stand as reported, reconciliation continues",
        report.failed().len(),
        report.outcomes.len()
      );
      for outcome in report.failed() {
        eprintln!(
          "   ❌ {} v{}: {}",
          outcome.package,
          outcome.version,
          outcome.error.as_deref().unwrap_or("unknown failure")
        );
      }
    }

    self.state = WorkflowState::AwaitingResetConfirmation;
    if !self
      .prompter
      .confirm("Discard working-tree changes and restore the original descriptors?")?
    {
      self.state = WorkflowState::Exited;
      println!("🛑 Leaving the working tree mutated for manual inspection");
      return Ok(WorkflowState::Exited);
    }

    self.state = WorkflowState::Resetting;
    reconcile(ctx, &dirs, &plan, &channel)?;

    if !ctx.dry_run {
      self.state = WorkflowState::AwaitingPushConfirmation;
      let question = format!("Commit and push the {} version bump?", ctx.config.umbrella);
      if self.prompter.confirm(&question)? {
        self.state = WorkflowState::Committing;
        if let Err(e) = commit_and_push(ctx, &dirs, &plan, &channel) {
          // Published artifacts stand; report for manual follow-up
          print_error(&e);
        }
      }
    }

    self.state = WorkflowState::Done;
    println!("🎉 Release workflow complete");
    Ok(WorkflowState::Done)
  }
}
