mod checks;
mod commands;
mod core;
mod utils;

use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::EventSource;
use core::error::{PagesError, print_error};
use core::event::EventOverrides;
use std::path::PathBuf;

/// Publish the manual and its versioned redirect farm to gh-pages
#[derive(Parser)]
#[command(name = "pages-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Log output format
  #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
  log_format: LogFormat,

  /// Directory the build and probe commands run in (default: current directory)
  #[arg(short = 'C', long = "workspace", global = true)]
  workspace: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
  Text,
  Json,
}

/// Where the trigger event comes from
#[derive(Args)]
struct EventArgs {
  /// workflow_run event payload (default: $GITHUB_EVENT_PATH)
  #[arg(long, value_name = "PATH")]
  event: Option<PathBuf>,
  /// Repository the upstream ran in (owner/name)
  #[arg(long)]
  repository: Option<String>,
  /// Branch the upstream ran on
  #[arg(long)]
  branch: Option<String>,
  /// Name of the upstream workflow
  #[arg(long)]
  workflow: Option<String>,
  /// Conclusion of the upstream run (success, failure, ...)
  #[arg(long)]
  conclusion: Option<String>,
  /// Commit the upstream built
  #[arg(long)]
  sha: Option<String>,
  /// Override the canonical repository from pages.toml
  #[arg(long, value_name = "OWNER/NAME")]
  canonical_repository: Option<String>,
}

impl EventArgs {
  fn source(&self) -> EventSource {
    EventSource {
      payload: self.event.clone(),
      overrides: EventOverrides {
        repository: self.repository.clone(),
        branch: self.branch.clone(),
        workflow: self.workflow.clone(),
        conclusion: self.conclusion.clone(),
        sha: self.sha.clone(),
      },
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Publishing
  // ============================================================================
  /// Publish the manual to gh-pages:/unstable and the redirect farm to gh-pages:/<version>
  Run {
    #[command(flatten)]
    event: EventArgs,
    /// Output the result in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show what `run` would do for an event without building or pushing
  Plan {
    #[command(flatten)]
    event: EventArgs,
    /// Run the version probe to resolve the redirect-farm folder
    #[arg(long)]
    probe: bool,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Setup & Inspection
  // ============================================================================
  /// Write a default pages.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },

  /// Run health checks and diagnostics
  Doctor {
    /// Also check that the publish remote is reachable
    #[arg(long)]
    thorough: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  use anstyle::{AnsiColor, Color, Style};

  let yellow = Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
  clap::builder::Styles::styled()
    .usage(yellow)
    .header(yellow)
    .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
    .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
    .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
    .valid(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Green))))
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn init_tracing(cli: &Cli) {
  use tracing_subscriber::{EnvFilter, fmt};

  let filter = match cli.verbose {
    0 => "pages_rail=info",
    1 => "pages_rail=debug",
    _ => "pages_rail=trace",
  };

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  match cli.log_format {
    LogFormat::Text => {
      fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    }
    LogFormat::Json => {
      fmt().json().with_env_filter(env_filter).with_writer(std::io::stderr).init();
    }
  }
}

fn main() {
  let cli = Cli::parse();
  init_tracing(&cli);

  let workspace = match cli.workspace.clone() {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(PagesError::Io(e)),
    },
  };

  let result = match cli.command {
    Commands::Run { event, json } => {
      commands::run_publish(&workspace, &event.source(), event.canonical_repository.as_deref(), json)
    }
    Commands::Plan { event, probe, json } => commands::run_plan(
      &workspace,
      &event.source(),
      event.canonical_repository.as_deref(),
      probe,
      json,
    ),
    Commands::Init { force } => commands::run_init(&workspace, force),
    Commands::Doctor { thorough, json } => commands::run_doctor(&workspace, thorough, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: PagesError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
