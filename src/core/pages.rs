//! Merge-replace publishing to a pages branch with system git
//!
//! Each deploy works in a fresh scratch checkout of the pages branch:
//!
//! 1. Shallow-clone the branch (or start an orphan branch if the remote has none)
//! 2. Replace `<target_folder>` with a copy of the artifact
//! 3. Stage only `<target_folder>`; if nothing changed, stop here
//! 4. Commit and push `HEAD:refs/heads/<branch>` without force
//!
//! Sibling folders are never touched because nothing outside the target
//! folder is written or staged. Redeploying identical content stages
//! nothing and reports [`DeployAck::Unchanged`].

use crate::core::artifact::{BuildArtifact, PublishTarget, validate_folder};
use crate::core::collaborators::{DeployAck, Publisher};
use crate::core::config::PagesConfig;
use crate::core::error::{DeployError, PagesError, PagesResult, ResultExt};
use crate::core::vcs::{CommitIdentity, SystemGit, remote_has_branch};
use crate::utils::{authenticated_remote, needs_token, redact_remote};
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info};

/// Publishes artifacts to a git remote's pages branch
pub struct GitPagesPublisher {
  remote: String,
  /// Environment variable holding the push token for http(s) remotes
  token_env: Option<String>,
  identity: CommitIdentity,
  /// Upstream commit the artifacts were built from, for commit messages
  source_sha: Option<String>,
}

impl GitPagesPublisher {
  /// Create a publisher for an explicit remote that needs no token
  pub fn new(remote: impl Into<String>, identity: CommitIdentity) -> Self {
    Self {
      remote: remote.into(),
      token_env: None,
      identity,
      source_sha: None,
    }
  }

  /// Create a publisher from configuration
  ///
  /// The token is read from the environment at deploy time and only for
  /// http(s) remotes, so building a publisher never fails.
  pub fn from_config(config: &PagesConfig) -> Self {
    Self {
      remote: config.publish.remote_url(&config.gate),
      token_env: Some(config.publish.token_env.clone()),
      identity: CommitIdentity {
        name: config.publish.author_name.clone(),
        email: config.publish.author_email.clone(),
      },
      source_sha: None,
    }
  }

  /// Remote URL with credentials embedded; never logged
  fn resolve_remote(&self) -> PagesResult<String> {
    if !needs_token(&self.remote) {
      return Ok(self.remote.clone());
    }
    let Some(var) = &self.token_env else {
      return Ok(self.remote.clone());
    };

    let token = std::env::var(var)
      .ok()
      .filter(|t| !t.trim().is_empty())
      .ok_or_else(|| PagesError::Deploy(DeployError::MissingCredential { var: var.clone() }))?;
    Ok(authenticated_remote(&self.remote, token.trim()))
  }

  /// Mention `sha` in deploy commit messages
  pub fn with_source_sha(mut self, sha: Option<String>) -> Self {
    self.source_sha = sha;
    self
  }

  fn commit_message(&self, artifact: &BuildArtifact, target: &PublishTarget) -> String {
    match &self.source_sha {
      Some(sha) => format!("Deploy {} to {} from {}", artifact.kind, target.target_folder, sha),
      None => format!("Deploy {} to {}", artifact.kind, target.target_folder),
    }
  }

  /// Check out `branch` into a scratch directory
  fn checkout(&self, remote: &str, scratch: &Path, branch: &str) -> PagesResult<SystemGit> {
    let dest = scratch.join("pages");
    if remote_has_branch(remote, branch)? {
      debug!(branch, remote = %redact_remote(remote), "cloning pages branch");
      SystemGit::clone_branch(remote, branch, &dest)
    } else {
      info!(branch, "pages branch does not exist yet, starting it");
      SystemGit::init(&dest, branch)
    }
  }

  fn deploy_inner(&self, artifact: &BuildArtifact, target: &PublishTarget) -> PagesResult<DeployAck> {
    validate_folder(&target.target_folder).map_err(|reason| {
      PagesError::Deploy(DeployError::InvalidTarget {
        folder: target.target_folder.clone(),
        reason,
      })
    })?;

    if !artifact.content_root.is_dir() {
      return Err(PagesError::Deploy(DeployError::ContentMissing {
        path: artifact.content_root.clone(),
      }));
    }

    let remote = self.resolve_remote()?;
    let scratch = TempDir::new().context("Failed to create scratch directory")?;
    let repo = self.checkout(&remote, scratch.path(), &target.branch)?;

    let folder = repo.work_tree().join(&target.target_folder);
    if folder.exists() {
      std::fs::remove_dir_all(&folder)
        .with_context(|| format!("Failed to clear {}", target.target_folder))?;
    }
    copy_directory_recursive(&artifact.content_root, &folder)?;

    repo.stage_all(&target.target_folder)?;
    if !repo.has_staged_changes()? {
      info!(target = %target, "content unchanged, nothing to push");
      return Ok(DeployAck::Unchanged {
        folder: target.target_folder.clone(),
      });
    }

    let commit = repo.commit(&self.commit_message(artifact, target), &self.identity)?;
    repo.push_head(&remote, &target.branch)?;
    info!(target = %target, commit = %commit, "pushed");

    Ok(DeployAck::Committed {
      folder: target.target_folder.clone(),
      commit,
    })
  }
}

impl Publisher for GitPagesPublisher {
  fn deploy(&self, artifact: &BuildArtifact, target: &PublishTarget) -> PagesResult<DeployAck> {
    self.deploy_inner(artifact, target).map_err(|e| match e {
      PagesError::Deploy(_) => e,
      other => PagesError::Deploy(DeployError::Failed {
        folder: target.target_folder.clone(),
        cause: other.to_string(),
      }),
    })
  }
}

/// Recursively copy a directory, following symlinks and excluding .git
///
/// Store paths are read-only; copies keep file contents and permissions
/// but directories are created writable so the scratch tree can be cleaned.
fn copy_directory_recursive(source: &Path, target: &Path) -> PagesResult<()> {
  std::fs::create_dir_all(target)?;

  for entry in std::fs::read_dir(source)? {
    let entry = entry?;
    let file_name = entry.file_name();

    // Skip .git directory
    if file_name == ".git" {
      continue;
    }

    let source_path = entry.path();
    let target_path = target.join(&file_name);

    if std::fs::metadata(&source_path)?.is_dir() {
      copy_directory_recursive(&source_path, &target_path)?;
    } else {
      std::fs::copy(&source_path, &target_path)
        .with_context(|| format!("Failed to copy {}", source_path.display()))?;
    }
  }

  Ok(())
}
