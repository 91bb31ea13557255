//! Artifacts produced by the build stages and the targets they are published to

use crate::core::error::ProbeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Branch holding every published folder side by side
pub const PAGES_BRANCH: &str = "gh-pages";

/// Folder the rendered manual is always published to
pub const MANUAL_FOLDER: &str = "unstable";

/// Which of the two artifacts a build produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
  /// Rendered manual
  Manual,
  /// Thin pages forwarding a versioned path to the manual
  RedirectFarm,
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactKind::Manual => write!(f, "manual"),
      ArtifactKind::RedirectFarm => write!(f, "redirect-farm"),
    }
  }
}

/// Output directory of one build, consumed once by the matching deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
  pub kind: ArtifactKind,
  pub content_root: PathBuf,
}

/// Where an artifact lands on the pages branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTarget {
  pub branch: String,
  pub target_folder: String,
}

impl PublishTarget {
  /// Target of the manual stage
  pub fn manual() -> Self {
    Self {
      branch: PAGES_BRANCH.to_string(),
      target_folder: MANUAL_FOLDER.to_string(),
    }
  }

  /// Target of the redirect-farm stage, named after the probed version
  pub fn redirect_farm(version: &VersionProbe) -> Self {
    Self {
      branch: PAGES_BRANCH.to_string(),
      target_folder: version.value().to_string(),
    }
  }
}

impl fmt::Display for PublishTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:/{}", self.branch, self.target_folder)
  }
}

/// The "future API version" read from project metadata
///
/// Construction validates that the value can be used verbatim as a folder
/// name on the pages branch. Surrounding whitespace (the trailing newline
/// of a command's stdout) is the only thing ever stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionProbe(String);

impl VersionProbe {
  pub fn parse(raw: &str) -> Result<Self, ProbeError> {
    let value = raw.trim();
    validate_folder(value).map_err(|reason| ProbeError::Unusable {
      value: value.to_string(),
      reason,
    })?;
    if value == MANUAL_FOLDER {
      return Err(ProbeError::Unusable {
        value: value.to_string(),
        reason: "reserved for the manual".to_string(),
      });
    }
    Ok(Self(value.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for VersionProbe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Check that `folder` is a single path segment safe to replace wholesale
pub fn validate_folder(folder: &str) -> Result<(), String> {
  if folder.is_empty() {
    return Err("empty value".to_string());
  }
  if folder == "." || folder == ".." {
    return Err("relative path component".to_string());
  }
  if folder.contains('/') || folder.contains('\\') {
    return Err("must be a single path segment".to_string());
  }
  if folder.eq_ignore_ascii_case(".git") {
    return Err("reserved by git".to_string());
  }
  if folder.chars().any(|c| c.is_control() || c.is_whitespace()) {
    return Err("contains whitespace or control characters".to_string());
  }
  Ok(())
}
