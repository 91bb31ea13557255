//! Collaborator seams of the publish sequencer
//!
//! The sequencer owns ordering and gating only. Producing artifacts, reading
//! the project version and writing to the pages branch are delegated to
//! implementations of these traits:
//!
//! - [`Builder`]: `build(kind) -> content_root` ([`crate::core::build::CommandBuilder`])
//! - [`VersionSource`]: `query_project_version() -> String` ([`crate::core::build::CommandVersionSource`])
//! - [`Publisher`]: merge-replace deploy ([`crate::core::pages::GitPagesPublisher`])
//!
//! Tests swap in recording fakes.

use crate::core::artifact::{ArtifactKind, BuildArtifact, PublishTarget};
use crate::core::error::PagesResult;
use serde::Serialize;
use std::fmt;

/// Produces artifacts. Must be deterministic for a given source state and
/// have no side effects beyond local output.
pub trait Builder {
  fn build(&self, kind: ArtifactKind) -> PagesResult<BuildArtifact>;
}

/// Reads the declared project version from build-time metadata
pub trait VersionSource {
  fn query_project_version(&self) -> PagesResult<String>;
}

/// Publishes an artifact to a folder of the pages branch
///
/// Contract: the folder's previous contents are fully replaced, sibling
/// folders are untouched, and redeploying unchanged content returns
/// [`DeployAck::Unchanged`] rather than an error.
pub trait Publisher {
  fn deploy(&self, artifact: &BuildArtifact, target: &PublishTarget) -> PagesResult<DeployAck>;
}

/// Acknowledgement of a completed deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeployAck {
  /// A commit was pushed
  Committed { folder: String, commit: String },
  /// Folder already held exactly this content
  Unchanged { folder: String },
}

impl DeployAck {
  pub fn folder(&self) -> &str {
    match self {
      DeployAck::Committed { folder, .. } | DeployAck::Unchanged { folder } => folder,
    }
  }

  pub fn is_unchanged(&self) -> bool {
    matches!(self, DeployAck::Unchanged { .. })
  }
}

impl fmt::Display for DeployAck {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DeployAck::Committed { folder, commit } => {
        write!(f, "{} @ {}", folder, commit.get(..12).unwrap_or(commit))
      }
      DeployAck::Unchanged { folder } => write!(f, "{} (unchanged)", folder),
    }
  }
}
