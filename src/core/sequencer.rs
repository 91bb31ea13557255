//! Publish sequencer: gate, then manual stage, then redirect-farm stage
//!
//! # Design
//!
//! A run is an explicit state machine. Each call to [`Sequencer::step`]
//! performs exactly one collaborator call and returns the next state:
//!
//! ```text
//! Init
//!   | build manual
//! ManualBuilt
//!   | deploy to gh-pages:/unstable
//! ManualPublished          <- resumable midpoint
//!   | query version
//! VersionProbed
//!   | build redirect farm
//! RedirectBuilt
//!   | deploy to gh-pages:/<version>
//! Done
//! ```
//!
//! Any failing step moves to `Failed(stage)`, which is terminal. Nothing is
//! retried and nothing already deployed is rolled back: a redirect-farm
//! failure after the manual went out leaves the manual published.
//!
//! The probed version lives only in the state value. Stage 2 therefore
//! never sees a version from an earlier run.

use crate::core::artifact::{ArtifactKind, BuildArtifact, PublishTarget, VersionProbe};
use crate::core::collaborators::{Builder, DeployAck, Publisher, VersionSource};
use crate::core::config::GateConfig;
use crate::core::error::{PagesError, PreconditionError};
use crate::core::event::TriggerEvent;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Step of a run that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Precondition,
  ManualBuild,
  ManualDeploy,
  VersionProbe,
  RedirectBuild,
  RedirectDeploy,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Stage::Precondition => "precondition",
      Stage::ManualBuild => "manual-build",
      Stage::ManualDeploy => "manual-deploy",
      Stage::VersionProbe => "version-probe",
      Stage::RedirectBuild => "redirect-build",
      Stage::RedirectDeploy => "redirect-deploy",
    };
    f.write_str(s)
  }
}

/// A run that stopped at `stage`
#[derive(Debug)]
pub struct StageFailure {
  pub stage: Stage,
  pub error: PagesError,
  /// Manual deploy that completed before the failure, if any
  pub manual: Option<DeployAck>,
}

/// Both deploys of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
  pub manual: DeployAck,
  pub version: VersionProbe,
  pub redirect_farm: DeployAck,
}

/// Result of [`Sequencer::run`]
#[derive(Debug)]
pub enum Outcome {
  Published(PublishReport),
  /// Event came from a repository other than the canonical one
  Skipped { repository: String },
  Failed(StageFailure),
}

/// Position of a run in the publish sequence
#[derive(Debug)]
pub enum RunState {
  Init,
  ManualBuilt {
    artifact: BuildArtifact,
  },
  ManualPublished {
    manual: DeployAck,
  },
  VersionProbed {
    manual: DeployAck,
    version: VersionProbe,
  },
  RedirectBuilt {
    manual: DeployAck,
    version: VersionProbe,
    artifact: BuildArtifact,
  },
  Done(PublishReport),
  Failed(StageFailure),
}

impl RunState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, RunState::Done(_) | RunState::Failed(_))
  }

  pub fn name(&self) -> &'static str {
    match self {
      RunState::Init => "init",
      RunState::ManualBuilt { .. } => "manual-built",
      RunState::ManualPublished { .. } => "manual-published",
      RunState::VersionProbed { .. } => "version-probed",
      RunState::RedirectBuilt { .. } => "redirect-built",
      RunState::Done(_) => "done",
      RunState::Failed(_) => "failed",
    }
  }
}

/// Decision of the gate for one event
#[derive(Debug)]
pub enum GateDecision {
  Proceed,
  Skip,
  Reject(PreconditionError),
}

/// Evaluate the gate for `event`
///
/// The repository check comes first and short-circuits: a fork is skipped
/// even when its upstream failed.
pub fn evaluate_gate(gate: &GateConfig, event: &TriggerEvent) -> GateDecision {
  // GitHub owner and repository names are case-insensitive
  if !event.repository_identifier.eq_ignore_ascii_case(&gate.canonical_repository) {
    return GateDecision::Skip;
  }

  if !event.conclusion.is_success() {
    return GateDecision::Reject(PreconditionError::UpstreamNotSuccessful {
      conclusion: event.conclusion.to_string(),
    });
  }

  if event.source_branch != gate.canonical_branch {
    return GateDecision::Reject(PreconditionError::WrongBranch {
      expected: gate.canonical_branch.clone(),
      actual: event.source_branch.clone(),
    });
  }

  if let Some(expected) = &gate.upstream_workflow
    && &event.source_workflow != expected
  {
    return GateDecision::Reject(PreconditionError::WrongWorkflow {
      expected: expected.clone(),
      actual: event.source_workflow.clone(),
    });
  }

  GateDecision::Proceed
}

/// Drives a run against its three collaborators
pub struct Sequencer<'a> {
  gate: &'a GateConfig,
  builder: &'a dyn Builder,
  versions: &'a dyn VersionSource,
  publisher: &'a dyn Publisher,
}

impl<'a> Sequencer<'a> {
  pub fn new(
    gate: &'a GateConfig,
    builder: &'a dyn Builder,
    versions: &'a dyn VersionSource,
    publisher: &'a dyn Publisher,
  ) -> Self {
    Self {
      gate,
      builder,
      versions,
      publisher,
    }
  }

  /// Gate `event`, then run both stages from the start
  pub fn run(&self, event: &TriggerEvent) -> Outcome {
    match evaluate_gate(self.gate, event) {
      GateDecision::Skip => {
        info!(
          repository = %event.repository_identifier,
          canonical = %self.gate.canonical_repository,
          "not the canonical repository, skipping"
        );
        Outcome::Skipped {
          repository: event.repository_identifier.clone(),
        }
      }
      GateDecision::Reject(precondition) => {
        warn!(error = %precondition, "precondition violated");
        Outcome::Failed(StageFailure {
          stage: Stage::Precondition,
          error: PagesError::Precondition(precondition),
          manual: None,
        })
      }
      GateDecision::Proceed => self.resume(RunState::Init),
    }
  }

  /// Step from `state` until the run finishes
  pub fn resume(&self, mut state: RunState) -> Outcome {
    while !state.is_terminal() {
      debug!(state = state.name(), "step");
      state = self.step(state);
    }

    match state {
      RunState::Done(report) => Outcome::Published(report),
      RunState::Failed(failure) => Outcome::Failed(failure),
      _ => unreachable!("loop exits only on terminal states"),
    }
  }

  /// Perform the single collaborator call that follows `state`
  pub fn step(&self, state: RunState) -> RunState {
    match state {
      RunState::Init => {
        info!(stage = %Stage::ManualBuild, "building manual");
        match self.builder.build(ArtifactKind::Manual) {
          Ok(artifact) => RunState::ManualBuilt { artifact },
          Err(error) => fail(Stage::ManualBuild, error, None),
        }
      }

      RunState::ManualBuilt { artifact } => {
        let target = PublishTarget::manual();
        info!(stage = %Stage::ManualDeploy, target = %target, "deploying manual");
        match self.publisher.deploy(&artifact, &target) {
          Ok(manual) => {
            info!(stage = %Stage::ManualDeploy, result = %manual, "manual published");
            RunState::ManualPublished { manual }
          }
          Err(error) => fail(Stage::ManualDeploy, error, None),
        }
      }

      RunState::ManualPublished { manual } => {
        info!(stage = %Stage::VersionProbe, "querying project version");
        let probed = self
          .versions
          .query_project_version()
          .and_then(|raw| VersionProbe::parse(&raw).map_err(PagesError::Probe));
        match probed {
          Ok(version) => {
            info!(stage = %Stage::VersionProbe, version = %version, "redirect farm target determined");
            RunState::VersionProbed { manual, version }
          }
          Err(error) => fail(Stage::VersionProbe, error, Some(manual)),
        }
      }

      RunState::VersionProbed { manual, version } => {
        info!(stage = %Stage::RedirectBuild, "building redirect farm");
        match self.builder.build(ArtifactKind::RedirectFarm) {
          Ok(artifact) => RunState::RedirectBuilt {
            manual,
            version,
            artifact,
          },
          Err(error) => fail(Stage::RedirectBuild, error, Some(manual)),
        }
      }

      RunState::RedirectBuilt {
        manual,
        version,
        artifact,
      } => {
        let target = PublishTarget::redirect_farm(&version);
        info!(stage = %Stage::RedirectDeploy, target = %target, "deploying redirect farm");
        match self.publisher.deploy(&artifact, &target) {
          Ok(redirect_farm) => {
            info!(stage = %Stage::RedirectDeploy, result = %redirect_farm, "redirect farm published");
            RunState::Done(PublishReport {
              manual,
              version,
              redirect_farm,
            })
          }
          Err(error) => fail(Stage::RedirectDeploy, error, Some(manual)),
        }
      }

      terminal @ (RunState::Done(_) | RunState::Failed(_)) => terminal,
    }
  }
}

fn fail(stage: Stage, error: PagesError, manual: Option<DeployAck>) -> RunState {
  if manual.is_some() {
    warn!(
      stage = %stage,
      error = %error,
      "run failed after the manual was published; redirect farm left stale"
    );
  } else {
    warn!(stage = %stage, error = %error, "run failed");
  }

  RunState::Failed(StageFailure { stage, error, manual })
}
