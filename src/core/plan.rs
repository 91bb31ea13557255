//! Dry-run plans for a publish run
//!
//! A plan lists the steps a run would take for an event without building or
//! pushing anything. Plans are JSON-serializable for review in CI logs and
//! carry a content-hash id: the same event and configuration always produce
//! the same id.

use crate::core::artifact::{ArtifactKind, MANUAL_FOLDER, PAGES_BRANCH, VersionProbe};
use crate::core::config::{BuildConfig, PagesConfig};
use crate::core::error::PagesResult;
use crate::core::event::TriggerEvent;
use crate::core::sequencer::{GateDecision, evaluate_gate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    Self(format!("{:x}", hasher.finalize()))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    self.0.get(..12).unwrap_or(&self.0)
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// What the gate decided for the planned event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PlanDecision {
  Publish,
  Skip { repository: String },
  Reject { reason: String },
}

/// Where the redirect farm would land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "folder", rename_all = "snake_case")]
pub enum FolderPlan {
  Known(String),
  /// Decided by the version probe at run time
  Undetermined,
}

impl fmt::Display for FolderPlan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FolderPlan::Known(folder) => write!(f, "{}", folder),
      FolderPlan::Undetermined => write!(f, "<version>"),
    }
  }
}

/// One step of a run, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanStep {
  Build {
    kind: ArtifactKind,
    command: Vec<String>,
    output: String,
  },
  Deploy {
    kind: ArtifactKind,
    branch: String,
    folder: FolderPlan,
  },
  ProbeVersion {
    command: Vec<String>,
  },
}

impl fmt::Display for PlanStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PlanStep::Build { kind, command, output } => {
        write!(f, "Build {} with `{}` (output: {})", kind, command.join(" "), output)
      }
      PlanStep::Deploy { kind, branch, folder } => write!(f, "Deploy {} to {}:/{}", kind, branch, folder),
      PlanStep::ProbeVersion { command } => write!(f, "Query project version with `{}`", command.join(" ")),
    }
  }
}

/// Dry-run plan for one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishPlan {
  /// Content hash of decision and steps
  pub id: PlanId,
  pub created_at: DateTime<Utc>,
  pub event: TriggerEvent,
  pub decision: PlanDecision,
  /// Probed version, when the probe was run for this plan
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  pub steps: Vec<PlanStep>,
}

impl PublishPlan {
  /// Plan a run of `event` under `config`
  ///
  /// `version` fills in the redirect-farm folder when already probed.
  pub fn new(config: &PagesConfig, event: &TriggerEvent, version: Option<&VersionProbe>) -> Self {
    let decision = match evaluate_gate(&config.gate, event) {
      GateDecision::Proceed => PlanDecision::Publish,
      GateDecision::Skip => PlanDecision::Skip {
        repository: event.repository_identifier.clone(),
      },
      GateDecision::Reject(reason) => PlanDecision::Reject {
        reason: reason.to_string(),
      },
    };

    let steps = if decision == PlanDecision::Publish {
      publish_steps(config, version)
    } else {
      Vec::new()
    };

    let mut plan = Self {
      id: PlanId::from_contents(&[]),
      created_at: Utc::now(),
      event: event.clone(),
      decision,
      version: version.map(|v| v.value().to_string()),
      steps,
    };
    plan.recompute_id();
    plan
  }

  /// Whether the planned run would publish anything
  pub fn publishes(&self) -> bool {
    self.decision == PlanDecision::Publish
  }

  fn recompute_id(&mut self) {
    // Timestamp excluded so identical inputs share an id
    let json = serde_json::to_vec(&(&self.event, &self.decision, &self.steps)).unwrap_or_default();
    self.id = PlanId::from_contents(&json);
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> PagesResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📋 Plan: publish ({})\n", self.id));
    output.push_str(&format!(
      "   Event: {} on {} ({})\n",
      self.event.repository_identifier, self.event.source_branch, self.event.conclusion
    ));

    match &self.decision {
      PlanDecision::Publish => {}
      PlanDecision::Skip { repository } => {
        output.push_str(&format!("\n⏭️  Skip: {} is not the canonical repository\n", repository));
        return output;
      }
      PlanDecision::Reject { reason } => {
        output.push_str(&format!("\n❌ Precondition failed: {}\n", reason));
        return output;
      }
    }

    output.push_str(&format!("\n   Steps ({}):\n", self.steps.len()));
    for (i, step) in self.steps.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, step));
    }

    if self.version.is_none() {
      output.push_str("\n   Redirect farm folder is decided by the version probe (use --probe)\n");
    }

    output
  }
}

fn build_step(kind: ArtifactKind, config: &BuildConfig) -> PlanStep {
  PlanStep::Build {
    kind,
    command: config.command.clone(),
    output: config.output.display().to_string(),
  }
}

fn publish_steps(config: &PagesConfig, version: Option<&VersionProbe>) -> Vec<PlanStep> {
  let redirect_folder = match version {
    Some(v) => FolderPlan::Known(v.value().to_string()),
    None => FolderPlan::Undetermined,
  };

  vec![
    build_step(ArtifactKind::Manual, &config.manual),
    PlanStep::Deploy {
      kind: ArtifactKind::Manual,
      branch: PAGES_BRANCH.to_string(),
      folder: FolderPlan::Known(MANUAL_FOLDER.to_string()),
    },
    PlanStep::ProbeVersion {
      command: config.version_probe.command.clone(),
    },
    build_step(ArtifactKind::RedirectFarm, &config.redirect_farm),
    PlanStep::Deploy {
      kind: ArtifactKind::RedirectFarm,
      branch: PAGES_BRANCH.to_string(),
      folder: redirect_folder,
    },
  ]
}
