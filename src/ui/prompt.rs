//! Operator confirmation gates
//!
//! The workflow blocks on yes/no decisions at its confirmation states. The
//! decision provider is a capability behind a trait so the state machine is
//! testable without a real terminal (scripted doubles live in tests).

use crate::core::error::{ReleaseResult, ResultExt};
use std::io::Write;

/// Ask yes/no, return bool
pub trait Prompter {
  /// Only an explicit yes answer returns true
  fn confirm(&mut self, question: &str) -> ReleaseResult<bool>;
}

/// Interactive terminal prompter, the default collaborator
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
  fn confirm(&mut self, question: &str) -> ReleaseResult<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    std::io::stdin()
      .read_line(&mut input)
      .context("Failed to read confirmation input")?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
  }
}
