//! CLI commands for pages-rail
//!
//! ## Publishing
//! - **run**: gate the trigger event and run both publish stages
//! - **plan**: show what `run` would do for an event, without side effects
//!
//! ## Setup & Inspection
//! - **init**: write a default pages.toml
//! - **doctor**: check git, configuration, build tools and credentials

pub mod doctor;
pub mod init;
pub mod plan;
pub mod run;

pub use doctor::run_doctor;
pub use init::run_init;
pub use plan::run_plan;
pub use run::run_publish;

use crate::core::config::PagesConfig;
use crate::core::error::PagesResult;
use crate::core::event::{EventOverrides, TriggerEvent};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a command finds its event
#[derive(Debug, Clone, Default)]
pub struct EventSource {
  /// Explicit payload file; falls back to `GITHUB_EVENT_PATH`
  pub payload: Option<PathBuf>,
  pub overrides: EventOverrides,
}

impl EventSource {
  /// Read and merge the trigger event
  pub fn resolve(&self) -> PagesResult<TriggerEvent> {
    let payload = self
      .payload
      .clone()
      .or_else(|| std::env::var_os("GITHUB_EVENT_PATH").map(PathBuf::from));
    debug!(payload = ?payload, "resolving trigger event");
    TriggerEvent::resolve(payload.as_deref(), &self.overrides)
  }
}

/// Load pages.toml from `workspace`, applying the `--canonical-repository` override
pub fn load_config(workspace: &Path, canonical_repository: Option<&str>) -> PagesResult<PagesConfig> {
  let mut config = PagesConfig::load(workspace)?;
  if let Some(repository) = canonical_repository {
    config.gate.canonical_repository = repository.to_string();
    config.validate()?;
  }
  Ok(config)
}
