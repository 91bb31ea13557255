//! The `run` command: publish the manual and the redirect farm

use super::{EventSource, load_config};
use crate::core::artifact::VersionProbe;
use crate::core::build::{CommandBuilder, CommandVersionSource};
use crate::core::collaborators::DeployAck;
use crate::core::error::PagesResult;
use crate::core::pages::GitPagesPublisher;
use crate::core::sequencer::{Outcome, Sequencer, Stage};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Machine-readable result of a run (`--json`)
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RunSummary<'a> {
  Published {
    repository: &'a str,
    manual: &'a DeployAck,
    version: &'a VersionProbe,
    redirect_farm: &'a DeployAck,
  },
  Skipped {
    repository: &'a str,
  },
  Failed {
    stage: Stage,
    kind: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    manual: Option<&'a DeployAck>,
  },
}

/// Run the publish sequence for the resolved event
///
/// `Published` and `Skipped` return `Ok`; a failed stage returns its error
/// so the process exits with the error's code.
pub fn run_publish(
  workspace: &Path,
  source: &EventSource,
  canonical_repository: Option<&str>,
  json: bool,
) -> PagesResult<()> {
  let config = load_config(workspace, canonical_repository)?;
  let event = source.resolve()?;
  info!(
    repository = %event.repository_identifier,
    branch = %event.source_branch,
    workflow = %event.source_workflow,
    conclusion = %event.conclusion,
    "trigger event"
  );

  let builder = CommandBuilder::new(workspace, &config);
  let versions = CommandVersionSource::new(workspace, &config.version_probe);
  let publisher = GitPagesPublisher::from_config(&config).with_source_sha(event.short_sha().map(String::from));
  let sequencer = Sequencer::new(&config.gate, &builder, &versions, &publisher);

  match sequencer.run(&event) {
    Outcome::Published(report) => {
      if json {
        print_json(&RunSummary::Published {
          repository: &event.repository_identifier,
          manual: &report.manual,
          version: &report.version,
          redirect_farm: &report.redirect_farm,
        })?;
      } else {
        println!("✅ Documentation published");
        println!("   manual        → gh-pages:/{} ({})", report.manual.folder(), report.manual);
        println!(
          "   redirect farm → gh-pages:/{} ({})",
          report.redirect_farm.folder(),
          report.redirect_farm
        );
        if report.manual.is_unchanged() && report.redirect_farm.is_unchanged() {
          println!("   Nothing changed; no commits were pushed");
        }
      }
      Ok(())
    }

    Outcome::Skipped { repository } => {
      if json {
        print_json(&RunSummary::Skipped {
          repository: &repository,
        })?;
      } else {
        println!(
          "⏭️  Skipping: {} is not {}, nothing to publish",
          repository, config.gate.canonical_repository
        );
      }
      Ok(())
    }

    Outcome::Failed(failure) => {
      if json {
        print_json(&RunSummary::Failed {
          stage: failure.stage,
          kind: failure.error.kind().to_string(),
          error: failure.error.to_string(),
          manual: failure.manual.as_ref(),
        })?;
      } else {
        eprintln!("❌ Stage '{}' failed ({})", failure.stage, failure.error.kind());
        if let Some(manual) = &failure.manual {
          eprintln!(
            "⚠️  The manual was already published to gh-pages:/{} ({}); it stays published",
            manual.folder(),
            manual
          );
        }
      }
      Err(failure.error)
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> PagesResult<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
