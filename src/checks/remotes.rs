//! Publish remote checks: credential presence and reachability

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::artifact::PAGES_BRANCH;
use crate::core::error::PagesResult;
use crate::core::vcs::remote_has_branch;
use crate::utils::{authenticated_remote, is_local_path, needs_token, redact_remote};

/// The push credential is present when the remote needs one
pub struct CredentialCheck;

impl Check for CredentialCheck {
  fn name(&self) -> &str {
    "credential"
  }

  fn description(&self) -> &str {
    "Validates that the push token is available for https remotes"
  }

  fn run(&self, ctx: &CheckContext) -> PagesResult<CheckResult> {
    let Some(config) = &ctx.config else {
      return Ok(CheckResult::pass(self.name(), "Skipped (configuration invalid)"));
    };

    let remote = config.publish.remote_url(&config.gate);
    if !needs_token(&remote) {
      if is_local_path(&remote) {
        return Ok(CheckResult::pass(self.name(), format!("No token needed for local remote {}", remote)));
      }
      if std::env::var_os("SSH_AUTH_SOCK").is_none() && std::env::var_os("GIT_SSH_COMMAND").is_none() {
        return Ok(CheckResult::warning(
          self.name(),
          format!("Neither SSH_AUTH_SOCK nor GIT_SSH_COMMAND is set for ssh remote {}", remote),
          Some("Load the deploy key into an ssh agent, or point GIT_SSH_COMMAND at it".to_string()),
        ));
      }
      return Ok(CheckResult::pass(self.name(), format!("ssh credentials available for {}", remote)));
    }

    let var = &config.publish.token_env;
    match std::env::var(var) {
      Ok(token) if !token.trim().is_empty() => Ok(CheckResult::pass(self.name(), format!("{} is set", var))),
      _ => Ok(CheckResult::error(
        self.name(),
        format!("{} is not set", var),
        Some(format!(
          "Export {} with a token allowed to push to {}",
          var,
          redact_remote(&remote)
        )),
      )),
    }
  }
}

/// The publish remote answers `git ls-remote`
pub struct RemoteAccessCheck;

impl Check for RemoteAccessCheck {
  fn name(&self) -> &str {
    "remote-access"
  }

  fn description(&self) -> &str {
    "Validates that the publish remote is reachable"
  }

  fn is_expensive(&self) -> bool {
    true
  }

  fn run(&self, ctx: &CheckContext) -> PagesResult<CheckResult> {
    let Some(config) = &ctx.config else {
      return Ok(CheckResult::pass(self.name(), "Skipped (configuration invalid)"));
    };

    let remote = config.publish.remote_url(&config.gate);
    let remote = match std::env::var(&config.publish.token_env) {
      Ok(token) if needs_token(&remote) && !token.trim().is_empty() => authenticated_remote(&remote, token.trim()),
      _ => remote,
    };

    match remote_has_branch(&remote, PAGES_BRANCH) {
      Ok(true) => Ok(CheckResult::pass(
        self.name(),
        format!("{} has branch {}", redact_remote(&remote), PAGES_BRANCH),
      )),
      Ok(false) => Ok(CheckResult::warning(
        self.name(),
        format!(
          "{} has no {} branch; the first deploy will create it",
          redact_remote(&remote),
          PAGES_BRANCH
        ),
        None::<String>,
      )),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        format!("Cannot reach {}: {}", redact_remote(&remote), e),
        Some("Check the remote URL and the token's permissions"),
      )),
    }
  }
}
