//! Local environment checks: git, configuration and build tools

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::config::PagesConfig;
use crate::core::error::PagesResult;
use crate::utils::find_program;
use std::process::Command;

/// git must be on PATH for every deploy
pub struct GitAvailableCheck;

impl Check for GitAvailableCheck {
  fn name(&self) -> &str {
    "git"
  }

  fn description(&self) -> &str {
    "Validates that git is installed"
  }

  fn run(&self, _ctx: &CheckContext) -> PagesResult<CheckResult> {
    match Command::new("git").arg("--version").output() {
      Ok(output) if output.status.success() => Ok(CheckResult::pass(
        self.name(),
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
      )),
      Ok(output) => Ok(CheckResult::error(
        self.name(),
        format!("git --version failed: {}", String::from_utf8_lossy(&output.stderr).trim()),
        Some("Reinstall git"),
      )),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        format!("git not found: {}", e),
        Some("Install git and make sure it is on PATH"),
      )),
    }
  }
}

/// pages.toml parses and validates (or is absent, in which case defaults apply)
pub struct ConfigCheck;

impl Check for ConfigCheck {
  fn name(&self) -> &str {
    "config"
  }

  fn description(&self) -> &str {
    "Validates pages.toml"
  }

  fn run(&self, ctx: &CheckContext) -> PagesResult<CheckResult> {
    let location = PagesConfig::find_config_path(&ctx.workspace_root);

    match PagesConfig::load(&ctx.workspace_root) {
      Ok(config) => {
        let source = match location {
          Some(path) => path.display().to_string(),
          None => "built-in defaults".to_string(),
        };
        Ok(CheckResult::pass(
          self.name(),
          format!(
            "Publishing {} from branch '{}' ({})",
            config.gate.canonical_repository, config.gate.canonical_branch, source
          ),
        ))
      }
      Err(e) => Ok(CheckResult::error(
        self.name(),
        e.to_string(),
        e.help_message().or(Some("Run 'pages-rail init --force' to regenerate pages.toml".to_string())),
      )),
    }
  }
}

/// Every configured build and probe program resolves on PATH
pub struct BuildToolsCheck;

impl Check for BuildToolsCheck {
  fn name(&self) -> &str {
    "build-tools"
  }

  fn description(&self) -> &str {
    "Validates that build and version-probe programs are on PATH"
  }

  fn run(&self, ctx: &CheckContext) -> PagesResult<CheckResult> {
    let Some(config) = &ctx.config else {
      return Ok(CheckResult::pass(self.name(), "Skipped (configuration invalid)"));
    };

    let mut programs: Vec<&str> = [
      &config.manual.command,
      &config.redirect_farm.command,
      &config.version_probe.command,
    ]
    .into_iter()
    .filter_map(|command| command.first().map(String::as_str))
    .collect();
    programs.sort_unstable();
    programs.dedup();

    let missing: Vec<&str> = programs
      .iter()
      .copied()
      .filter(|program| find_program(program, &ctx.workspace_root).is_none())
      .collect();

    if missing.is_empty() {
      Ok(CheckResult::pass(self.name(), format!("Found {}", programs.join(", "))))
    } else {
      Ok(CheckResult::error(
        self.name(),
        format!("Not found on PATH: {}", missing.join(", ")),
        Some("Install the missing tools or change the commands in pages.toml"),
      ))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn ctx(temp: &TempDir, config: Option<PagesConfig>) -> CheckContext {
    CheckContext {
      workspace_root: temp.path().to_path_buf(),
      config,
      thorough: false,
    }
  }

  #[test]
  fn test_config_check_defaults_and_invalid() {
    let temp = TempDir::new().unwrap();
    let result = ConfigCheck.run(&ctx(&temp, None)).unwrap();
    assert!(result.passed);
    assert!(result.message.contains("built-in defaults"));

    fs::write(
      temp.path().join("pages.toml"),
      "[gate]\ncanonical_repository = \"nope\"\n",
    )
    .unwrap();
    let result = ConfigCheck.run(&ctx(&temp, None)).unwrap();
    assert!(!result.passed);
  }

  #[test]
  fn test_build_tools_reports_missing_programs() {
    let temp = TempDir::new().unwrap();
    let mut config = PagesConfig::new();
    config.manual.command = vec!["sh".to_string(), "-c".to_string(), "true".to_string()];
    config.redirect_farm.command = vec!["pages-rail-no-such-tool".to_string()];
    config.version_probe.command = vec!["sh".to_string()];

    let result = BuildToolsCheck.run(&ctx(&temp, Some(config))).unwrap();
    assert!(!result.passed);
    assert_eq!(result.message, "Not found on PATH: pages-rail-no-such-tool");
  }

  #[test]
  fn test_build_tools_skipped_without_config() {
    let temp = TempDir::new().unwrap();
    assert!(BuildToolsCheck.run(&ctx(&temp, None)).unwrap().passed);
  }
}
