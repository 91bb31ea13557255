//! Trigger events handed to the sequencer by the scheduler
//!
//! The scheduler is GitHub Actions: a `workflow_run` event fires when the
//! upstream pipeline completes, and its JSON payload is written to the file
//! named by `GITHUB_EVENT_PATH`. Only the handful of fields the gate needs
//! are read from it.

use crate::core::error::{PagesError, PagesResult, PreconditionError, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Outcome of the upstream pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
  Success,
  Failure,
  /// cancelled, skipped, timed_out, ...
  Other(String),
}

impl Conclusion {
  pub fn parse(s: &str) -> Self {
    match s.trim().to_ascii_lowercase().as_str() {
      "success" => Conclusion::Success,
      "failure" => Conclusion::Failure,
      other => Conclusion::Other(other.to_string()),
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, Conclusion::Success)
  }
}

impl fmt::Display for Conclusion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Conclusion::Success => write!(f, "success"),
      Conclusion::Failure => write!(f, "failure"),
      Conclusion::Other(s) => write!(f, "{}", s),
    }
  }
}

/// The event a run was invoked for. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
  /// Name of the upstream pipeline
  pub source_workflow: String,
  pub source_branch: String,
  pub conclusion: Conclusion,
  /// `owner/name` of the repository the upstream ran in
  pub repository_identifier: String,
  /// Commit the upstream built, when known
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub head_sha: Option<String>,
}

/// Per-field overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct EventOverrides {
  pub repository: Option<String>,
  pub branch: Option<String>,
  pub workflow: Option<String>,
  pub conclusion: Option<String>,
  pub sha: Option<String>,
}

impl EventOverrides {
  fn is_empty(&self) -> bool {
    self.repository.is_none()
      && self.branch.is_none()
      && self.workflow.is_none()
      && self.conclusion.is_none()
      && self.sha.is_none()
  }
}

#[derive(Debug, Deserialize)]
struct WorkflowRunPayload {
  workflow_run: WorkflowRun,
  #[serde(default)]
  repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
  name: String,
  head_branch: Option<String>,
  conclusion: Option<String>,
  #[serde(default)]
  head_sha: Option<String>,
  #[serde(default)]
  repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
  full_name: String,
}

impl TriggerEvent {
  /// Parse a `workflow_run` webhook payload
  ///
  /// The repository the upstream ran in (`workflow_run.repository`) wins
  /// over the repository hosting this workflow, so that a run copied into
  /// a fork is recognized as the fork.
  pub fn from_workflow_run_json(json: &str) -> PagesResult<Self> {
    let payload: WorkflowRunPayload = serde_json::from_str(json).context("Failed to parse workflow_run payload")?;
    let run = payload.workflow_run;

    let repository = run
      .repository
      .or(payload.repository)
      .map(|r| r.full_name)
      .ok_or_else(|| {
        PagesError::Precondition(PreconditionError::MissingEvent {
          field: "repository.full_name".to_string(),
        })
      })?;

    Ok(Self {
      source_workflow: run.name,
      source_branch: run.head_branch.unwrap_or_default(),
      conclusion: run
        .conclusion
        .as_deref()
        .map(Conclusion::parse)
        .unwrap_or_else(|| Conclusion::Other("pending".to_string())),
      repository_identifier: repository,
      head_sha: run.head_sha,
    })
  }

  /// Read a `workflow_run` payload from disk
  pub fn load(path: &Path) -> PagesResult<Self> {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read event payload from {}", path.display()))?;
    Self::from_workflow_run_json(&content)
  }

  /// Assemble an event from an optional payload file plus CLI overrides
  ///
  /// Without a payload every gate field must come from the overrides.
  pub fn resolve(payload: Option<&Path>, overrides: &EventOverrides) -> PagesResult<Self> {
    let base = match payload {
      Some(path) => Some(Self::load(path)?),
      None => None,
    };

    if base.is_none() && overrides.is_empty() {
      return Err(PagesError::Precondition(PreconditionError::MissingEvent {
        field: "event".to_string(),
      }));
    }

    let missing = |field: &str| {
      PagesError::Precondition(PreconditionError::MissingEvent {
        field: field.to_string(),
      })
    };

    let repository_identifier = overrides
      .repository
      .clone()
      .or_else(|| base.as_ref().map(|b| b.repository_identifier.clone()))
      .ok_or_else(|| missing("repository"))?;
    let source_branch = overrides
      .branch
      .clone()
      .or_else(|| base.as_ref().map(|b| b.source_branch.clone()))
      .ok_or_else(|| missing("branch"))?;
    let conclusion = overrides
      .conclusion
      .as_deref()
      .map(Conclusion::parse)
      .or_else(|| base.as_ref().map(|b| b.conclusion.clone()))
      .ok_or_else(|| missing("conclusion"))?;
    let source_workflow = overrides
      .workflow
      .clone()
      .or_else(|| base.as_ref().map(|b| b.source_workflow.clone()))
      .unwrap_or_default();
    let head_sha = overrides.sha.clone().or_else(|| base.and_then(|b| b.head_sha));

    Ok(Self {
      source_workflow,
      source_branch,
      conclusion,
      repository_identifier,
      head_sha,
    })
  }

  /// Short form of the upstream commit for commit messages
  pub fn short_sha(&self) -> Option<&str> {
    self.head_sha.as_deref().map(|sha| sha.get(..7).unwrap_or(sha))
  }
}
