//! End-to-end tests for the `run` command against a local bare remote

use crate::helpers::*;
use anyhow::Result;

fn run_args(repository: &str) -> Vec<String> {
  run_args_for(repository, "main", "success")
}

fn run_args_for(repository: &str, branch: &str, conclusion: &str) -> Vec<String> {
  let mut args = vec!["run".to_string(), "--json".to_string()];
  args.extend(upstream_event_args(repository, branch, conclusion));
  args
}

#[test]
fn test_canonical_success_publishes_both_folders() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail(&workspace.path, &run_args("zhaofengli/colmena"))?;
  let summary = stdout_json(&output)?;
  assert_eq!(summary["status"], "published");
  assert_eq!(summary["version"], "v2");
  assert_eq!(summary["manual"]["folder"], "unstable");
  assert_eq!(summary["redirect_farm"]["folder"], "v2");

  assert_eq!(workspace.pages_files()?, vec!["unstable/index.html", "v2/index.html"]);
  assert_eq!(workspace.read_pages("unstable/index.html")?, "<h1>manual</h1>\n");
  assert_eq!(workspace.read_pages("v2/index.html")?, "redirect\n");
  assert_eq!(workspace.pages_commits()?, 2);

  Ok(())
}

#[test]
fn test_fork_is_skipped_without_side_effects() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  let output = run_pages_rail(&workspace.path, &run_args("someone/colmena"))?;
  assert_eq!(stdout_json(&output)?["status"], "skipped");

  assert!(!workspace.file_exists("built-manual"));
  assert!(!workspace.file_exists("probed"));
  assert!(!workspace.file_exists("built-redirects"));
  assert!(!workspace.has_pages_branch()?);

  Ok(())
}

#[test]
fn test_failed_upstream_is_precondition_failure() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let args = run_args_for("zhaofengli/colmena", "main", "failure");

  let output = run_pages_rail_raw(&workspace.path, &args)?;
  assert_eq!(output.status.code(), Some(3));
  let summary = stdout_json(&output)?;
  assert_eq!(summary["status"], "failed");
  assert_eq!(summary["stage"], "precondition");

  assert!(!workspace.file_exists("built-manual"));
  assert!(!workspace.has_pages_branch()?);

  Ok(())
}

#[test]
fn test_wrong_branch_is_precondition_failure() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let args = run_args_for("zhaofengli/colmena", "release-0.4", "success");

  let output = run_pages_rail_raw(&workspace.path, &args)?;
  assert_eq!(output.status.code(), Some(3));
  assert_eq!(stdout_json(&output)?["stage"], "precondition");
  assert!(!workspace.file_exists("built-manual"));

  Ok(())
}

#[test]
fn test_manual_build_failure_stops_before_any_deploy() -> Result<()> {
  let workspace = PagesWorkspace::with_scripts(&Scripts {
    manual: "touch built-manual && exit 1",
    ..Scripts::default()
  })?;

  let output = run_pages_rail_raw(&workspace.path, &run_args("zhaofengli/colmena"))?;
  assert_eq!(output.status.code(), Some(2));
  assert_eq!(stdout_json(&output)?["stage"], "manual-build");

  assert!(workspace.file_exists("built-manual"));
  assert!(!workspace.file_exists("probed"));
  assert!(!workspace.file_exists("built-redirects"));
  assert!(!workspace.has_pages_branch()?);

  Ok(())
}

#[test]
fn test_empty_version_keeps_manual_published() -> Result<()> {
  let workspace = PagesWorkspace::with_scripts(&Scripts {
    probe: "touch probed && printf ''",
    ..Scripts::default()
  })?;

  let output = run_pages_rail_raw(&workspace.path, &run_args("zhaofengli/colmena"))?;
  assert_eq!(output.status.code(), Some(2));
  let summary = stdout_json(&output)?;
  assert_eq!(summary["stage"], "version-probe");
  assert_eq!(summary["manual"]["folder"], "unstable");

  assert_eq!(workspace.pages_files()?, vec!["unstable/index.html"]);
  assert!(!workspace.file_exists("built-redirects"));

  Ok(())
}

#[test]
fn test_redirect_build_failure_does_not_roll_back_manual() -> Result<()> {
  let workspace = PagesWorkspace::with_scripts(&Scripts {
    redirect_farm: "exit 7",
    ..Scripts::default()
  })?;

  let output = run_pages_rail_raw(&workspace.path, &run_args("zhaofengli/colmena"))?;
  assert_eq!(output.status.code(), Some(2));
  assert_eq!(stdout_json(&output)?["stage"], "redirect-build");
  assert_eq!(workspace.pages_files()?, vec!["unstable/index.html"]);

  Ok(())
}

#[test]
fn test_second_identical_run_is_a_no_op() -> Result<()> {
  let workspace = PagesWorkspace::new()?;

  run_pages_rail(&workspace.path, &run_args("zhaofengli/colmena"))?;
  let files = workspace.pages_files()?;
  let commits = workspace.pages_commits()?;

  let output = run_pages_rail(&workspace.path, &run_args("zhaofengli/colmena"))?;
  let summary = stdout_json(&output)?;
  assert_eq!(summary["manual"]["result"], "unchanged");
  assert_eq!(summary["redirect_farm"]["result"], "unchanged");

  assert_eq!(workspace.pages_files()?, files);
  assert_eq!(workspace.pages_commits()?, commits);

  Ok(())
}

#[test]
fn test_existing_folders_are_left_alone() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  workspace.seed_pages(&[
    ("v1/index.html", "old redirect"),
    ("unstable/stale.html", "from an older manual"),
    ("CNAME", "colmena.example.org"),
  ])?;

  run_pages_rail(&workspace.path, &run_args("zhaofengli/colmena"))?;

  assert_eq!(
    workspace.pages_files()?,
    vec!["CNAME", "unstable/index.html", "v1/index.html", "v2/index.html"]
  );
  assert_eq!(workspace.read_pages("v1/index.html")?, "old redirect");
  assert_eq!(workspace.read_pages("CNAME")?, "colmena.example.org");

  Ok(())
}

#[test]
fn test_version_change_adds_a_new_folder() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  run_pages_rail(&workspace.path, &run_args("zhaofengli/colmena"))?;

  workspace.write_config(&Scripts {
    probe: "echo v3",
    ..Scripts::default()
  })?;
  let output = run_pages_rail(&workspace.path, &run_args("zhaofengli/colmena"))?;
  assert_eq!(stdout_json(&output)?["version"], "v3");

  assert_eq!(
    workspace.pages_files()?,
    vec!["unstable/index.html", "v2/index.html", "v3/index.html"]
  );

  Ok(())
}

#[test]
fn test_event_payload_file() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let payload = workspace.path.join("event.json");
  std::fs::write(
    &payload,
    r#"{
  "action": "completed",
  "workflow_run": {
    "name": "Build",
    "head_branch": "main",
    "head_sha": "0123456789abcdef0123456789abcdef01234567",
    "conclusion": "success",
    "repository": { "full_name": "zhaofengli/colmena" }
  },
  "repository": { "full_name": "zhaofengli/colmena" }
}"#,
  )?;

  run_pages_rail(
    &workspace.path,
    &["run", "--event", payload.to_str().unwrap_or_default()],
  )?;
  assert_eq!(workspace.pages_files()?, vec!["unstable/index.html", "v2/index.html"]);

  let log = git(&workspace.remote, &["log", "-1", "--format=%s", "gh-pages"])?;
  assert!(String::from_utf8_lossy(&log.stdout).contains("from 0123456"));

  Ok(())
}

#[test]
fn test_canonical_repository_override() -> Result<()> {
  let workspace = PagesWorkspace::new()?;
  let mut args = run_args("me/colmena-fork");
  args.extend(["--canonical-repository".to_string(), "me/colmena-fork".to_string()]);

  let output = run_pages_rail(&workspace.path, &args)?;
  assert_eq!(stdout_json(&output)?["status"], "published");

  Ok(())
}
