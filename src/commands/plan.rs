//! The `plan` command: dry-run of `run`

use super::{EventSource, load_config};
use crate::core::artifact::VersionProbe;
use crate::core::build::CommandVersionSource;
use crate::core::collaborators::VersionSource;
use crate::core::error::{PagesError, PagesResult};
use crate::core::plan::PublishPlan;
use std::path::Path;

/// Print the steps a run would take for the resolved event
///
/// Nothing is built or pushed. With `probe` the version probe runs (it is
/// read-only) so the redirect-farm folder can be shown.
pub fn run_plan(
  workspace: &Path,
  source: &EventSource,
  canonical_repository: Option<&str>,
  probe: bool,
  json: bool,
) -> PagesResult<()> {
  let config = load_config(workspace, canonical_repository)?;
  let event = source.resolve()?;

  let mut plan = PublishPlan::new(&config, &event, None);
  if probe && plan.publishes() {
    let raw = CommandVersionSource::new(workspace, &config.version_probe).query_project_version()?;
    let version = VersionProbe::parse(&raw).map_err(PagesError::Probe)?;
    plan = PublishPlan::new(&config, &event, Some(&version));
  }

  if json {
    println!("{}", plan.to_json()?);
  } else {
    print!("{}", plan.to_human_readable());
  }

  Ok(())
}
