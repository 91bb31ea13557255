//! Tests for `init`, `doctor` and argument handling

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  run_pages_rail(temp.path(), &["init"])?;

  let config = std::fs::read_to_string(temp.path().join("pages.toml"))?;
  assert!(config.contains("[gate]"));
  assert!(config.contains("zhaofengli/colmena"));
  assert!(config.contains("nix"));

  Ok(())
}

#[test]
fn test_init_refuses_existing_config() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let before = workspace.read_file("pages.toml")?;

  let output = run_pages_rail_raw(&workspace.path, &["init"])?;
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(workspace.read_file("pages.toml")?, before);

  run_pages_rail(&workspace.path, &["init", "--force"])?;
  assert_ne!(workspace.read_file("pages.toml")?, before);

  Ok(())
}

#[test]
fn test_doctor_passes_for_local_remote() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail(&workspace.path, &["doctor", "--json", "--thorough"])?;
  let results = stdout_json(&output)?;
  let names: Vec<&str> = results
    .as_array()
    .map(|r| r.iter().filter_map(|c| c["check_name"].as_str()).collect())
    .unwrap_or_default();
  assert_eq!(names, vec!["git", "config", "build-tools", "credential", "remote-access"]);

  Ok(())
}

#[test]
fn test_doctor_fails_on_invalid_config() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  std::fs::write(
    workspace.path.join("pages.toml"),
    "[gate]\ncanonical_repository = \"not-a-repo\"\n",
  )?;

  let output = run_pages_rail_raw(&workspace.path, &["doctor", "--json"])?;
  assert_eq!(output.status.code(), Some(3));

  Ok(())
}

#[test]
fn test_run_without_event_is_an_error() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail_raw(&workspace.path, &["run"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(!workspace.file_exists("built-manual"));

  Ok(())
}

#[test]
fn test_workspace_flag_runs_builds_elsewhere() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let elsewhere = tempfile::TempDir::new()?;

  let mut args = vec![
    "-C".to_string(),
    workspace.path.display().to_string(),
    "run".to_string(),
  ];
  args.extend(event_args("zhaofengli/colmena"));
  run_pages_rail(elsewhere.path(), &args)?;

  assert!(workspace.file_exists("built-manual"));
  assert_eq!(workspace.pages_files()?, vec!["unstable/index.html", "v2/index.html"]);

  Ok(())
}
