//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Project checkout plus a local bare repository standing in for the publish remote
pub struct PagesWorkspace {
  _root: TempDir,
  /// Directory the build and probe commands run in
  pub path: PathBuf,
  /// Bare repository pages-rail pushes to
  pub remote: PathBuf,
}

/// Shell scripts used as the three collaborators
pub struct Scripts<'a> {
  pub manual: &'a str,
  pub redirect_farm: &'a str,
  pub probe: &'a str,
}

impl Default for Scripts<'_> {
  fn default() -> Self {
    Self {
      manual: "touch built-manual && mkdir -p out/manual && echo '<h1>manual</h1>' > out/manual/index.html",
      redirect_farm: "touch built-redirects && mkdir -p out/redirects && echo 'redirect' > out/redirects/index.html",
      probe: "touch probed && echo v2",
    }
  }
}

impl PagesWorkspace {
  /// Create a workspace configured with the default scripts
  pub fn new() -> Result<Self> {
    Self::with_scripts(&Scripts::default())
  }

  pub fn with_scripts(scripts: &Scripts<'_>) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let remote = root.path().join("remote.git");
    std::fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "--quiet", "--initial-branch=main", path_str(&remote)?])?;

    let workspace = Self {
      _root: root,
      path,
      remote,
    };
    workspace.write_config(scripts)?;
    Ok(workspace)
  }

  /// Write pages.toml pointing at the local remote
  pub fn write_config(&self, scripts: &Scripts<'_>) -> Result<()> {
    // JSON string literals are valid TOML basic strings
    let quote = |s: &str| serde_json::to_string(s);
    let config = format!(
      r#"[gate]
canonical_repository = "zhaofengli/colmena"
canonical_branch = "main"

[manual]
command = ["sh", "-c", {}]
output = "out/manual"

[redirect_farm]
command = ["sh", "-c", {}]
output = "out/redirects"

[version_probe]
command = ["sh", "-c", {}]

[publish]
remote = {}
"#,
      quote(scripts.manual)?,
      quote(scripts.redirect_farm)?,
      quote(scripts.probe)?,
      quote(path_str(&self.remote)?)?
    );
    std::fs::write(self.path.join("pages.toml"), config)?;
    Ok(())
  }

  /// Push `files` into `gh-pages` as an existing deployment
  pub fn seed_pages(&self, files: &[(&str, &str)]) -> Result<()> {
    let root = self.path.parent().context("workspace has no parent")?;
    let seed = root.join("seed");
    git(root, &["init", "--quiet", "--initial-branch=gh-pages", path_str(&seed)?])?;
    git(&seed, &["config", "user.name", "Test User"])?;
    git(&seed, &["config", "user.email", "test@example.com"])?;

    for (path, content) in files {
      let file = seed.join(path);
      if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::write(file, content)?;
    }

    git(&seed, &["add", "."])?;
    git(&seed, &["commit", "--quiet", "-m", "Seed pages"])?;
    git(&seed, &["push", "--quiet", path_str(&self.remote)?, "gh-pages"])?;
    Ok(())
  }

  /// Whether the remote has a gh-pages branch
  pub fn has_pages_branch(&self) -> Result<bool> {
    let output = git(&self.remote, &["branch", "--list", "gh-pages"])?;
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
  }

  /// Files on gh-pages, sorted
  pub fn pages_files(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &["ls-tree", "-r", "--name-only", "gh-pages"])?;
    let mut files: Vec<String> = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(String::from)
      .collect();
    files.sort();
    Ok(files)
  }

  /// Contents of `path` on gh-pages
  pub fn read_pages(&self, path: &str) -> Result<String> {
    let output = git(&self.remote, &["show", &format!("gh-pages:{}", path)])?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }

  /// Number of commits on gh-pages
  pub fn pages_commits(&self) -> Result<usize> {
    let output = git(&self.remote, &["rev-list", "--count", "gh-pages"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// Check if a file exists in the workspace
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file in the workspace
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Event flags for a successful upstream run on `main` in `repository`
pub fn event_args(repository: &str) -> Vec<String> {
  upstream_event_args(repository, "main", "success")
}

/// Event flags for an upstream run with the given branch and conclusion
pub fn upstream_event_args(repository: &str, branch: &str, conclusion: &str) -> Vec<String> {
  vec![
    "--repository".to_string(),
    repository.to_string(),
    "--branch".to_string(),
    branch.to_string(),
    "--workflow".to_string(),
    "Build".to_string(),
    "--conclusion".to_string(),
    conclusion.to_string(),
  ]
}

fn path_str(path: &Path) -> Result<&str> {
  path.to_str().context("non-UTF-8 temp path")
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run pages-rail and return its output whatever the exit status
pub fn run_pages_rail_raw<S: AsRef<str>>(cwd: &Path, args: &[S]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_pages-rail");
  let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();

  Command::new(bin)
    .current_dir(cwd)
    .args(&args)
    .env_remove("GITHUB_EVENT_PATH")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run pages-rail")
}

/// Run pages-rail, failing unless it exits successfully
pub fn run_pages_rail<S: AsRef<str>>(cwd: &Path, args: &[S]) -> Result<Output> {
  let output = run_pages_rail_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "pages-rail command failed: pages-rail {}\nstdout: {}\nstderr: {}",
      args.iter().map(|a| a.as_ref()).collect::<Vec<&str>>().join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Parse stdout of a `--json` invocation
pub fn stdout_json(output: &Output) -> Result<serde_json::Value> {
  serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}
