//! System git backend - zero dependencies
//!
//! Every call is a `git` subprocess with an isolated environment:
//! - Working directory passed with `-C`
//! - Environment cleared except PATH, HOME and the ssh, proxy and TLS settings
//! - Terminal prompts disabled, so a bad credential fails instead of hanging

use crate::core::error::{GitError, PagesError, PagesResult, ResultExt};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> PagesResult<Self> {
    let output = isolated_command()
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(PagesError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(PagesError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Initialize an empty repository whose first commit will land on `branch`
  pub fn init(path: &Path, branch: &str) -> PagesResult<Self> {
    std::fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {}", path.display()))?;

    let output = isolated_command()
      .arg("init")
      .arg(format!("--initial-branch={}", branch))
      .arg(path)
      .output()
      .context("Failed to execute git init")?;
    check_status(&output, "git init")?;

    Self::open(path)
  }

  /// Shallow-clone a single branch of `remote` into `dest`
  ///
  /// `remote` may carry credentials; it never appears in error messages.
  pub fn clone_branch(remote: &str, branch: &str, dest: &Path) -> PagesResult<Self> {
    let output = isolated_command()
      .args(["clone", "--quiet", "--depth", "1", "--single-branch", "--branch", branch, "--", remote])
      .arg(dest)
      .output()
      .context("Failed to execute git clone")?;
    check_status(&output, &format!("git clone --branch {}", branch))?;

    Self::open(dest)
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> PagesResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "HEAD"])
      .output()
      .context("Failed to get HEAD commit")?;
    check_status(&output, "git rev-parse HEAD")?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a safe git command bound to this repository
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = isolated_command();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }
}

/// Variables git still sees inside the isolated environment
///
/// ssh remotes authenticate through the agent or `GIT_SSH_COMMAND`.
const PASSTHROUGH_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "SSH_AUTH_SOCK",
  "GIT_SSH",
  "GIT_SSH_COMMAND",
  "HTTP_PROXY",
  "HTTPS_PROXY",
  "NO_PROXY",
  "http_proxy",
  "https_proxy",
  "no_proxy",
  "SSL_CERT_FILE",
  "SSL_CERT_DIR",
  "GIT_SSL_CAINFO",
];

/// Create a git command with an isolated environment
///
/// - Clears environment variables
/// - Whitelists [`PASSTHROUGH_ENV`]
/// - Adds safe configuration overrides
pub(crate) fn isolated_command() -> Command {
  isolated_command_with(|name| std::env::var_os(name))
}

fn isolated_command_with(lookup: impl Fn(&str) -> Option<OsString>) -> Command {
  let mut cmd = Command::new("git");

  // Isolated environment (don't trust global config)
  cmd.env_clear();
  for name in PASSTHROUGH_ENV {
    if let Some(value) = lookup(name) {
      cmd.env(name, value);
    }
  }
  cmd.env("GIT_TERMINAL_PROMPT", "0");

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("protocol.version=2");
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false");
  cmd.arg("-c").arg("core.autocrlf=false");

  cmd
}

/// Map a failed git invocation to [`GitError::CommandFailed`]
pub(crate) fn check_status(output: &Output, command: &str) -> PagesResult<()> {
  if output.status.success() {
    return Ok(());
  }
  Err(PagesError::Git(GitError::CommandFailed {
    command: command.to_string(),
    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
  }))
}
