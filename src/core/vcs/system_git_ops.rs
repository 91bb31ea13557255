//! Additional operations for SystemGit (staging, commits, remotes)

use super::system_git::{SystemGit, check_status, isolated_command};
use crate::core::error::{DeployError, PagesError, PagesResult, ResultExt};
use tracing::debug;

/// Identity recorded on deploy commits
#[derive(Debug, Clone)]
pub struct CommitIdentity {
  pub name: String,
  pub email: String,
}

/// Check whether `branch` exists on `remote`
///
/// Uses `git ls-remote --heads`, which needs no local repository.
pub fn remote_has_branch(remote: &str, branch: &str) -> PagesResult<bool> {
  let output = isolated_command()
    .args(["ls-remote", "--heads", "--", remote])
    .arg(format!("refs/heads/{}", branch))
    .output()
    .context("Failed to run git ls-remote")?;
  check_status(&output, "git ls-remote --heads")?;

  Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

impl SystemGit {
  /// Stage every change (additions, modifications, deletions) under `pathspec`
  ///
  /// Ignore rules do not apply: everything in the folder is published.
  pub fn stage_all(&self, pathspec: &str) -> PagesResult<()> {
    let output = self
      .git_cmd()
      .args(["add", "--all", "--force", "--", pathspec])
      .output()
      .context("Failed to run git add")?;
    check_status(&output, "git add --all --force")
  }

  /// Whether the index differs from HEAD (or holds anything, on an unborn branch)
  pub fn has_staged_changes(&self) -> PagesResult<bool> {
    let has_head = self.git_cmd().args(["rev-parse", "--verify", "--quiet", "HEAD"]).output()?.status.success();

    let output = if has_head {
      self.git_cmd().args(["diff", "--cached", "--quiet"]).output()?
    } else {
      // Unborn branch: anything in the index is a change
      let listed = self
        .git_cmd()
        .args(["ls-files", "--cached"])
        .output()
        .context("Failed to run git ls-files")?;
      check_status(&listed, "git ls-files --cached")?;
      return Ok(!listed.stdout.is_empty());
    };

    // Exit code 1 means there are differences (i.e., staged changes)
    match output.status.code() {
      Some(0) => Ok(false),
      Some(1) => Ok(true),
      _ => {
        check_status(&output, "git diff --cached --quiet")?;
        Ok(false)
      }
    }
  }

  /// Commit the index and return the new commit SHA
  pub fn commit(&self, message: &str, identity: &CommitIdentity) -> PagesResult<String> {
    let output = self
      .git_cmd()
      .arg("-c")
      .arg(format!("user.name={}", identity.name))
      .arg("-c")
      .arg(format!("user.email={}", identity.email))
      .args(["commit", "--quiet", "--no-verify", "-m", message])
      .output()
      .context("Failed to run git commit")?;
    check_status(&output, "git commit")?;

    self.head_commit()
  }

  /// Push HEAD to `branch` on `remote`, never forced
  ///
  /// A rejected push (the branch moved under us) becomes
  /// [`DeployError::PushFailed`].
  pub fn push_head(&self, remote: &str, branch: &str) -> PagesResult<()> {
    debug!(branch, "pushing HEAD");
    let output = self
      .git_cmd()
      .args(["push", "--quiet", "--", remote])
      .arg(format!("HEAD:refs/heads/{}", branch))
      .output()
      .context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(PagesError::Deploy(DeployError::PushFailed {
        branch: branch.to_string(),
        reason: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn identity() -> CommitIdentity {
    CommitIdentity {
      name: "Test User".to_string(),
      email: "test@example.com".to_string(),
    }
  }

  #[test]
  fn test_stage_commit_and_detect_no_changes() {
    let temp = TempDir::new().unwrap();
    let repo = SystemGit::init(&temp.path().join("repo"), "gh-pages").unwrap();

    fs::create_dir_all(repo.work_tree().join("unstable")).unwrap();
    fs::write(repo.work_tree().join("unstable/index.html"), "<h1>hi</h1>").unwrap();

    repo.stage_all("unstable").unwrap();
    assert!(repo.has_staged_changes().unwrap());
    let sha = repo.commit("Deploy manual to unstable", &identity()).unwrap();
    assert_eq!(sha.len(), 40);

    repo.stage_all("unstable").unwrap();
    assert!(!repo.has_staged_changes().unwrap());
    assert_eq!(repo.head_commit().unwrap(), sha);
  }

  #[test]
  fn test_empty_index_on_unborn_branch_has_no_changes() {
    let temp = TempDir::new().unwrap();
    let repo = SystemGit::init(&temp.path().join("repo"), "gh-pages").unwrap();
    assert!(!repo.has_staged_changes().unwrap());
  }

  #[test]
  fn test_remote_has_branch() {
    let temp = TempDir::new().unwrap();
    let repo = SystemGit::init(&temp.path().join("repo"), "gh-pages").unwrap();
    let remote = repo.work_tree().display().to_string();
    assert!(!remote_has_branch(&remote, "gh-pages").unwrap());

    fs::write(repo.work_tree().join("README"), "x").unwrap();
    repo.stage_all(".").unwrap();
    repo.commit("init", &identity()).unwrap();
    assert!(remote_has_branch(&remote, "gh-pages").unwrap());
    assert!(!remote_has_branch(&remote, "main").unwrap());
  }
}
