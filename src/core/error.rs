//! Error types for pages-rail with contextual messages and exit codes
//!
//! Every run that does not publish or skip ends in one of these errors. The
//! variants mirror the stages of a publish run (precondition, build, probe,
//! deploy) plus the ambient failures (config, git plumbing, I/O) that can
//! occur underneath them. Most errors carry a help message that is printed
//! after the error itself.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for pages-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (builds, git, network, I/O)
  System = 2,
  /// Validation failure (gate preconditions, doctor checks)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Coarse classification of a [`PagesError`], reported alongside the failed stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Precondition,
  Build,
  Probe,
  Deploy,
  Config,
  Git,
  Io,
  Other,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ErrorKind::Precondition => "precondition",
      ErrorKind::Build => "build",
      ErrorKind::Probe => "probe",
      ErrorKind::Deploy => "deploy",
      ErrorKind::Config => "config",
      ErrorKind::Git => "git",
      ErrorKind::Io => "io",
      ErrorKind::Other => "other",
    };
    f.write_str(s)
  }
}

/// Main error type for pages-rail
#[derive(Debug)]
pub enum PagesError {
  /// Trigger event does not satisfy the publish preconditions
  Precondition(PreconditionError),

  /// An artifact failed to build
  Build(BuildError),

  /// The version probe failed or produced an unusable value
  Probe(ProbeError),

  /// The publish collaborator could not complete the merge-replace
  Deploy(DeployError),

  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl PagesError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PagesError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    PagesError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      PagesError::Message { message, context, help } => PagesError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Classify this error
  pub fn kind(&self) -> ErrorKind {
    match self {
      PagesError::Precondition(_) => ErrorKind::Precondition,
      PagesError::Build(_) => ErrorKind::Build,
      PagesError::Probe(_) => ErrorKind::Probe,
      PagesError::Deploy(_) => ErrorKind::Deploy,
      PagesError::Config(_) => ErrorKind::Config,
      PagesError::Git(_) => ErrorKind::Git,
      PagesError::Io(_) => ErrorKind::Io,
      PagesError::Message { .. } => ErrorKind::Other,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      PagesError::Config(_) => ExitCode::User,
      PagesError::Precondition(_) => ExitCode::Validation,
      PagesError::Build(_) | PagesError::Probe(_) | PagesError::Deploy(_) => ExitCode::System,
      PagesError::Git(_) => ExitCode::System,
      PagesError::Io(_) => ExitCode::System,
      PagesError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      PagesError::Precondition(e) => e.help_message(),
      PagesError::Build(e) => e.help_message(),
      PagesError::Probe(e) => e.help_message(),
      PagesError::Deploy(e) => e.help_message(),
      PagesError::Config(e) => e.help_message(),
      PagesError::Git(e) => e.help_message(),
      PagesError::Message { help, .. } => help.clone(),
      PagesError::Io(_) => None,
    }
  }
}

impl fmt::Display for PagesError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PagesError::Precondition(e) => write!(f, "{}", e),
      PagesError::Build(e) => write!(f, "{}", e),
      PagesError::Probe(e) => write!(f, "{}", e),
      PagesError::Deploy(e) => write!(f, "{}", e),
      PagesError::Config(e) => write!(f, "{}", e),
      PagesError::Git(e) => write!(f, "{}", e),
      PagesError::Io(e) => write!(f, "I/O error: {}", e),
      PagesError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for PagesError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PagesError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for PagesError {
  fn from(err: io::Error) -> Self {
    PagesError::Io(err)
  }
}

impl From<String> for PagesError {
  fn from(msg: String) -> Self {
    PagesError::message(msg)
  }
}

impl From<&str> for PagesError {
  fn from(msg: &str) -> Self {
    PagesError::message(msg)
  }
}

impl From<toml_edit::de::Error> for PagesError {
  fn from(err: toml_edit::de::Error) -> Self {
    PagesError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for PagesError {
  fn from(err: toml_edit::ser::Error) -> Self {
    PagesError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for PagesError {
  fn from(err: serde_json::Error) -> Self {
    PagesError::message(format!("JSON error: {}", err))
  }
}

impl From<GitError> for PagesError {
  fn from(err: GitError) -> Self {
    PagesError::Git(err)
  }
}

/// Gate violations detected when the sequencer is invoked directly
#[derive(Debug)]
pub enum PreconditionError {
  /// Upstream pipeline did not succeed
  UpstreamNotSuccessful { conclusion: String },

  /// Upstream ran on a branch other than the canonical one
  WrongBranch { expected: String, actual: String },

  /// Triggered by a pipeline other than the configured upstream
  WrongWorkflow { expected: String, actual: String },

  /// The trigger event could not be assembled
  MissingEvent { field: String },
}

impl PreconditionError {
  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::UpstreamNotSuccessful { .. } => {
        Some("Publishing only follows a successful upstream build. Re-run the upstream pipeline first.".to_string())
      }
      PreconditionError::WrongBranch { expected, .. } => Some(format!(
        "Restrict the scheduler trigger to the '{}' branch.",
        expected
      )),
      PreconditionError::WrongWorkflow { expected, .. } => Some(format!(
        "Trigger this run from the '{}' workflow, or adjust gate.upstream_workflow in pages.toml.",
        expected
      )),
      PreconditionError::MissingEvent { .. } => Some(
        "Pass --event <path> (a workflow_run payload), set GITHUB_EVENT_PATH, or supply --repository/--branch/--conclusion."
          .to_string(),
      ),
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::UpstreamNotSuccessful { conclusion } => {
        write!(f, "Precondition failed: upstream conclusion is '{}', expected 'success'", conclusion)
      }
      PreconditionError::WrongBranch { expected, actual } => {
        write!(
          f,
          "Precondition failed: upstream ran on branch '{}', expected '{}'",
          actual, expected
        )
      }
      PreconditionError::WrongWorkflow { expected, actual } => {
        write!(
          f,
          "Precondition failed: triggered by workflow '{}', expected '{}'",
          actual, expected
        )
      }
      PreconditionError::MissingEvent { field } => {
        write!(f, "Precondition failed: trigger event is missing '{}'", field)
      }
    }
  }
}

/// Build collaborator failures
#[derive(Debug)]
pub enum BuildError {
  /// The build command could not be started
  Spawn { command: String, reason: String },

  /// The build command exited unsuccessfully
  CommandFailed { command: String, status: String },

  /// The build finished but its output directory is missing
  MissingOutput { path: PathBuf },
}

impl BuildError {
  fn help_message(&self) -> Option<String> {
    match self {
      BuildError::Spawn { command, .. } => Some(format!(
        "Make sure '{}' is installed and on PATH. Run `pages-rail doctor` to diagnose.",
        command.split_whitespace().next().unwrap_or(command)
      )),
      BuildError::MissingOutput { .. } => {
        Some("Check that the build command's out-link matches the configured `output`.".to_string())
      }
      BuildError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::Spawn { command, reason } => write!(f, "Failed to start build `{}`: {}", command, reason),
      BuildError::CommandFailed { command, status } => write!(f, "Build `{}` failed ({})", command, status),
      BuildError::MissingOutput { path } => {
        write!(f, "Build output is not a directory: {}", path.display())
      }
    }
  }
}

/// Version probe failures
#[derive(Debug)]
pub enum ProbeError {
  /// The probe command could not be started
  Spawn { command: String, reason: String },

  /// The probe command exited unsuccessfully
  CommandFailed { command: String, stderr: String },

  /// The probe printed nothing
  Empty { command: String },

  /// The probe printed something that cannot be used as a folder name
  Unusable { value: String, reason: String },
}

impl ProbeError {
  fn help_message(&self) -> Option<String> {
    match self {
      ProbeError::Empty { .. } | ProbeError::Unusable { .. } => Some(
        "The version probe must print a single path segment such as `0.4`. Check version_probe.command in pages.toml."
          .to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ProbeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProbeError::Spawn { command, reason } => {
        write!(f, "Failed to start version probe `{}`: {}", command, reason)
      }
      ProbeError::CommandFailed { command, stderr } => {
        write!(f, "Version probe `{}` failed:\n{}", command, stderr)
      }
      ProbeError::Empty { command } => write!(f, "Version probe `{}` returned an empty value", command),
      ProbeError::Unusable { value, reason } => {
        write!(f, "Version probe returned unusable value '{}': {}", value, reason)
      }
    }
  }
}

/// Publish collaborator failures
#[derive(Debug)]
pub enum DeployError {
  /// Credential variable is not set for a remote that needs it
  MissingCredential { var: String },

  /// Target folder is not a single safe path segment
  InvalidTarget { folder: String, reason: String },

  /// Content root does not exist
  ContentMissing { path: PathBuf },

  /// Push rejected or failed
  PushFailed { branch: String, reason: String },

  /// Any other failure while preparing the merge-replace
  Failed { folder: String, cause: String },
}

impl DeployError {
  fn help_message(&self) -> Option<String> {
    match self {
      DeployError::MissingCredential { var } => Some(format!(
        "Export {} with a token that can push to the pages branch.",
        var
      )),
      DeployError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("fetch first") {
          Some("The pages branch moved during the run. Re-run the whole publish; each stage is idempotent.".to_string())
        } else if reason.contains("403") || reason.contains("Authentication failed") {
          Some("Check that the token has write access to the repository contents.".to_string())
        } else {
          None
        }
      }
      _ => None,
    }
  }
}

impl fmt::Display for DeployError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DeployError::MissingCredential { var } => {
        write!(f, "Deploy failed: credential variable {} is not set", var)
      }
      DeployError::InvalidTarget { folder, reason } => {
        write!(f, "Deploy failed: invalid target folder '{}': {}", folder, reason)
      }
      DeployError::ContentMissing { path } => {
        write!(f, "Deploy failed: content root not found: {}", path.display())
      }
      DeployError::PushFailed { branch, reason } => {
        write!(f, "Deploy failed: push to {} rejected: {}", branch, reason)
      }
      DeployError::Failed { folder, cause } => {
        write!(f, "Deploy to '{}' failed: {}", folder, cause)
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file could not be parsed
  Invalid { path: PathBuf, reason: String },

  /// Missing or empty required field
  MissingField { field: String },

  /// Field present but malformed
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { .. } => Some("Run `pages-rail init --force` to regenerate a default pages.toml.".to_string()),
      ConfigError::MissingField { field } => Some(format!("Set `{}` in pages.toml.", field)),
      ConfigError::InvalidValue { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for {}: {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Result type alias for pages-rail
pub type PagesResult<T> = Result<T, PagesError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PagesResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> PagesResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PagesError>,
{
  fn context(self, ctx: impl Into<String>) -> PagesResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> PagesResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PagesError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for PagesError {
  fn from(err: anyhow::Error) -> Self {
    PagesError::message(err.to_string())
  }
}
