//! Health check command for diagnosing a publishing setup
//!
//! The doctor command runs all checks and reports any issues found.

use std::path::Path;

use crate::checks::{CheckContext, Severity, create_default_runner};
use crate::core::config::PagesConfig;
use crate::core::error::{ExitCode, PagesResult};

/// Run the doctor command
///
/// Exits with the validation code if any check reports an error.
pub fn run_doctor(workspace: &Path, thorough: bool, json: bool) -> PagesResult<()> {
  let ctx = CheckContext {
    workspace_root: workspace.to_path_buf(),
    config: PagesConfig::load(workspace).ok(),
    thorough,
  };

  let runner = create_default_runner();
  let results = runner.run_all(&ctx)?;
  let has_errors = results.iter().any(|r| !r.passed && r.severity == Severity::Error);

  if json {
    // JSON output for CI/automation
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    println!("🏥 Running health checks...\n");

    println!("📋 Registered checks:");
    for check in runner.checks() {
      println!("   • {}: {}", check.name(), check.description());
    }
    println!();

    let mut has_warnings = false;
    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.check_name, result.message);

      if !result.passed {
        if let Some(ref suggestion) = result.suggestion {
          println!("   💡 Fix: {}", suggestion);
        }
        if result.severity == Severity::Warning {
          has_warnings = true;
        }
      }
    }

    let passed_count = results.iter().filter(|r| r.passed).count();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", passed_count, results.len());

    if has_errors {
      println!("\n⚠️  Critical issues found. A run would fail.");
    } else if has_warnings {
      println!("\n⚠️  Some warnings found. Consider addressing them.");
    } else {
      println!("\n✨ All checks passed! Ready to publish.");
    }
  }

  if has_errors {
    std::process::exit(ExitCode::Validation.as_i32());
  }

  Ok(())
}
