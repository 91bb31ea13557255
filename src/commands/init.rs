use std::path::Path;

use crate::core::config::PagesConfig;
use crate::core::error::{PagesError, PagesResult};

/// Run the init command to write a default pages.toml
pub fn run_init(workspace: &Path, force: bool) -> PagesResult<()> {
  if let Some(existing) = PagesConfig::find_config_path(workspace)
    && !force
  {
    return Err(PagesError::with_help(
      format!("Configuration already exists at {}", existing.display()),
      "Pass --force to overwrite it with the defaults",
    ));
  }

  let config = PagesConfig::new();
  let path = config.save(workspace)?;

  println!("✅ Wrote {}", path.display());
  println!("\n🚀 Next steps:");
  println!(
    "   1. Check [gate] canonical_repository (currently {})",
    config.gate.canonical_repository
  );
  println!("   2. Adjust the build and version-probe commands if your flake differs");
  println!("   3. Run: pages-rail doctor");

  Ok(())
}
