//! Tests for the `plan` command

use crate::helpers::*;
use anyhow::Result;

fn plan_args(repository: &str, extra: &[&str]) -> Vec<String> {
  let mut args = vec!["plan".to_string(), "--json".to_string()];
  args.extend(event_args(repository));
  args.extend(extra.iter().map(|s| s.to_string()));
  args
}

#[test]
fn test_plan_has_no_side_effects() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail(&workspace.path, &plan_args("zhaofengli/colmena", &[]))?;
  let plan = stdout_json(&output)?;

  assert_eq!(plan["decision"]["decision"], "publish");
  assert_eq!(plan["steps"].as_array().map(Vec::len), Some(5));
  assert_eq!(plan["steps"][1]["folder"]["folder"], "unstable");
  assert_eq!(plan["steps"][4]["folder"]["state"], "undetermined");
  assert_eq!(plan["id"].as_str().map(str::len), Some(64));

  assert!(!workspace.file_exists("built-manual"));
  assert!(!workspace.file_exists("probed"));
  assert!(!workspace.has_pages_branch()?);

  Ok(())
}

#[test]
fn test_plan_with_probe_resolves_folder() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail(&workspace.path, &plan_args("zhaofengli/colmena", &["--probe"]))?;
  let plan = stdout_json(&output)?;

  assert_eq!(plan["version"], "v2");
  assert_eq!(plan["steps"][4]["folder"]["folder"], "v2");
  assert!(workspace.file_exists("probed"));
  assert!(!workspace.file_exists("built-manual"));

  Ok(())
}

#[test]
fn test_plan_for_fork_skips_and_never_probes() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail(&workspace.path, &plan_args("someone/colmena", &["--probe"]))?;
  let plan = stdout_json(&output)?;

  assert_eq!(plan["decision"]["decision"], "skip");
  assert_eq!(plan["steps"].as_array().map(Vec::len), Some(0));
  assert!(!workspace.file_exists("probed"));

  Ok(())
}

#[test]
fn test_plan_human_output() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let mut args = vec!["plan".to_string()];
  args.extend(event_args("zhaofengli/colmena"));

  let output = run_pages_rail(&workspace.path, &args)?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Deploy manual to gh-pages:/unstable"));
  assert!(stdout.contains("Deploy redirect-farm to gh-pages:/<version>"));

  Ok(())
}
