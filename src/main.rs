mod core;
mod manifest;
mod release;
mod ui;

use clap::Parser;
use core::context::ReleaseContext;
use core::error::{ReleaseResult, print_error};
use release::workflow::{ReleaseWorkflow, WorkflowState};
use ui::prompt::TerminalPrompter;

/// Build, version, publish, and reconcile a channel package set
#[derive(Parser)]
#[command(name = "channel-release")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Pass the registry dry-run flag to every publish and skip the commit/push gate
  #[arg(long)]
  dry_run: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  // Every caught error exits 1; a declined reset gate is a clean exit 0
  if let Err(err) = run(&cwd, cli.dry_run) {
    print_error(&err);
    std::process::exit(1);
  }
}

fn run(dir: &std::path::Path, dry_run: bool) -> ReleaseResult<WorkflowState> {
  // Context built once, passed by reference everywhere
  let ctx = ReleaseContext::build(dir, dry_run)?;
  let mut prompter = TerminalPrompter;
  ReleaseWorkflow::new(&ctx, &mut prompter).run()
}
