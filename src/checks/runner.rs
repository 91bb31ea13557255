//! Check runner for executing doctor checks

use super::trait_def::{Check, CheckContext, CheckResult};
use anyhow::Result;
use std::sync::Arc;

/// Check runner that executes multiple checks in registration order
pub struct CheckRunner {
  checks: Vec<Arc<dyn Check>>,
}

impl CheckRunner {
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  pub fn add_check(&mut self, check: Arc<dyn Check>) {
    self.checks.push(check);
  }

  /// Run all checks and collect results
  pub fn run_all(&self, ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    for check in &self.checks {
      // Skip expensive checks if not thorough mode
      if check.is_expensive() && !ctx.thorough {
        continue;
      }

      match check.run(ctx) {
        Ok(result) => results.push(result),
        Err(err) => {
          // If a check itself fails to run, create an error result
          results.push(CheckResult::error(
            check.name(),
            format!("Check failed to run: {}", err),
            Some("Re-run with -v for details"),
          ));
        }
      }
    }

    Ok(results)
  }

  /// Get all registered checks
  pub fn checks(&self) -> &[Arc<dyn Check>] {
    &self.checks
  }
}

impl Default for CheckRunner {
  fn default() -> Self {
    Self::new()
  }
}

/// Create a runner with all built-in checks
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Arc::new(super::environment::GitAvailableCheck));
  runner.add_check(Arc::new(super::environment::ConfigCheck));
  runner.add_check(Arc::new(super::environment::BuildToolsCheck));
  runner.add_check(Arc::new(super::remotes::CredentialCheck));
  runner.add_check(Arc::new(super::remotes::RemoteAccessCheck));

  runner
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::PagesConfig;
  use crate::core::error::PagesResult;
  use tempfile::TempDir;

  struct Broken;

  impl Check for Broken {
    fn name(&self) -> &str {
      "broken"
    }

    fn description(&self) -> &str {
      "always errors"
    }

    fn run(&self, _ctx: &CheckContext) -> PagesResult<CheckResult> {
      Err(crate::core::error::PagesError::message("boom"))
    }
  }

  struct Network;

  impl Check for Network {
    fn name(&self) -> &str {
      "network"
    }

    fn description(&self) -> &str {
      "needs network"
    }

    fn run(&self, _ctx: &CheckContext) -> PagesResult<CheckResult> {
      Ok(CheckResult::pass(self.name(), "ok"))
    }

    fn is_expensive(&self) -> bool {
      true
    }
  }

  #[test]
  fn test_failing_check_becomes_error_result_and_expensive_skipped() {
    let temp = TempDir::new().unwrap();
    let mut runner = CheckRunner::new();
    runner.add_check(Arc::new(Broken));
    runner.add_check(Arc::new(Network));

    let ctx = CheckContext {
      workspace_root: temp.path().to_path_buf(),
      config: Some(PagesConfig::new()),
      thorough: false,
    };
    let results = runner.run_all(&ctx).unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert!(results[0].message.contains("boom"));

    let thorough = CheckContext { thorough: true, ..ctx };
    assert_eq!(runner.run_all(&thorough).unwrap().len(), 2);
  }
}
