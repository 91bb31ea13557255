//! Subprocess build and version-probe collaborators
//!
//! Both run a configured argv from the workspace directory. Build output is
//! streamed to the terminal (nix builds are long and their logs belong in
//! the CI log); probe output is captured because it is the value.

use crate::core::artifact::{ArtifactKind, BuildArtifact};
use crate::core::collaborators::{Builder, VersionSource};
use crate::core::config::{BuildConfig, PagesConfig, ProbeConfig};
use crate::core::error::{BuildError, PagesError, PagesResult, ProbeError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Runs the configured build command for each artifact kind
pub struct CommandBuilder {
  workspace: PathBuf,
  manual: BuildConfig,
  redirect_farm: BuildConfig,
}

impl CommandBuilder {
  pub fn new(workspace: &Path, config: &PagesConfig) -> Self {
    Self {
      workspace: workspace.to_path_buf(),
      manual: config.manual.clone(),
      redirect_farm: config.redirect_farm.clone(),
    }
  }

  fn config_for(&self, kind: ArtifactKind) -> &BuildConfig {
    match kind {
      ArtifactKind::Manual => &self.manual,
      ArtifactKind::RedirectFarm => &self.redirect_farm,
    }
  }
}

impl Builder for CommandBuilder {
  fn build(&self, kind: ArtifactKind) -> PagesResult<BuildArtifact> {
    let config = self.config_for(kind);
    let shown = display_command(&config.command);
    let (program, args) = split_command(&config.command).ok_or_else(|| {
      PagesError::Build(BuildError::Spawn {
        command: shown.clone(),
        reason: "empty command".to_string(),
      })
    })?;

    info!(kind = %kind, command = %shown, "running build");
    let status = Command::new(program)
      .args(args)
      .current_dir(&self.workspace)
      .stdin(Stdio::null())
      .status()
      .map_err(|e| {
        PagesError::Build(BuildError::Spawn {
          command: shown.clone(),
          reason: e.to_string(),
        })
      })?;

    if !status.success() {
      return Err(PagesError::Build(BuildError::CommandFailed {
        command: shown,
        status: status.to_string(),
      }));
    }

    let output = self.workspace.join(&config.output);
    // Follows out-link symlinks into the store
    let content_root = output
      .canonicalize()
      .ok()
      .filter(|p| p.is_dir())
      .ok_or(PagesError::Build(BuildError::MissingOutput { path: output }))?;

    debug!(kind = %kind, content_root = %content_root.display(), "build finished");
    Ok(BuildArtifact { kind, content_root })
  }
}

/// Reads the project version by running the configured probe command
pub struct CommandVersionSource {
  workspace: PathBuf,
  command: Vec<String>,
}

impl CommandVersionSource {
  pub fn new(workspace: &Path, config: &ProbeConfig) -> Self {
    Self {
      workspace: workspace.to_path_buf(),
      command: config.command.clone(),
    }
  }
}

impl VersionSource for CommandVersionSource {
  fn query_project_version(&self) -> PagesResult<String> {
    let shown = display_command(&self.command);
    let (program, args) = split_command(&self.command).ok_or_else(|| {
      PagesError::Probe(ProbeError::Spawn {
        command: shown.clone(),
        reason: "empty command".to_string(),
      })
    })?;

    let output = Command::new(program)
      .args(args)
      .current_dir(&self.workspace)
      .stdin(Stdio::null())
      .output()
      .map_err(|e| {
        PagesError::Probe(ProbeError::Spawn {
          command: shown.clone(),
          reason: e.to_string(),
        })
      })?;

    if !output.status.success() {
      return Err(PagesError::Probe(ProbeError::CommandFailed {
        command: shown,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    let value = String::from_utf8_lossy(&output.stdout).to_string();
    if value.trim().is_empty() {
      return Err(PagesError::Probe(ProbeError::Empty { command: shown }));
    }

    Ok(value)
  }
}

fn split_command(command: &[String]) -> Option<(&str, &[String])> {
  let (program, args) = command.split_first()?;
  if program.trim().is_empty() {
    return None;
  }
  Some((program.as_str(), args))
}

fn display_command(command: &[String]) -> String {
  command.join(" ")
}
