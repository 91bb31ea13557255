use crate::core::error::{ConfigError, PagesError, PagesResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for pages-rail
/// Searched in order: pages.toml, .pages.toml, .config/pages.toml
///
/// Every section has defaults matching the canonical project, so a missing
/// file is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesConfig {
  #[serde(default)]
  pub gate: GateConfig,
  #[serde(default = "default_manual")]
  pub manual: BuildConfig,
  #[serde(default = "default_redirect_farm")]
  pub redirect_farm: BuildConfig,
  #[serde(default)]
  pub version_probe: ProbeConfig,
  #[serde(default)]
  pub publish: PublishConfig,
}

/// Which upstream runs are allowed to publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
  /// `owner/name` of the only repository allowed to publish
  #[serde(default = "default_canonical_repository")]
  pub canonical_repository: String,

  /// Branch the upstream build must have run on
  #[serde(default = "default_canonical_branch")]
  pub canonical_branch: String,

  /// Name of the upstream pipeline (unchecked when unset)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub upstream_workflow: Option<String>,
}

fn default_canonical_repository() -> String {
  "zhaofengli/colmena".to_string()
}

fn default_canonical_branch() -> String {
  "main".to_string()
}

impl Default for GateConfig {
  fn default() -> Self {
    Self {
      canonical_repository: default_canonical_repository(),
      canonical_branch: default_canonical_branch(),
      upstream_workflow: None,
    }
  }
}

/// External build producing one artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
  /// Program and arguments, run from the workspace directory
  pub command: Vec<String>,

  /// Directory (or symlink to one) the command leaves its output in
  pub output: PathBuf,
}

fn default_manual() -> BuildConfig {
  BuildConfig {
    command: ["nix", "build", ".#manual", "-L", "--out-link", "result-manual"]
      .map(String::from)
      .to_vec(),
    output: PathBuf::from("result-manual"),
  }
}

fn default_redirect_farm() -> BuildConfig {
  BuildConfig {
    command: [
      "nix",
      "build",
      ".#manual.redirectFarm",
      "-L",
      "--out-link",
      "result-redirect-farm",
    ]
    .map(String::from)
    .to_vec(),
    output: PathBuf::from("result-redirect-farm"),
  }
}

/// Query printing the future API version on stdout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
  #[serde(default = "default_probe_command")]
  pub command: Vec<String>,
}

fn default_probe_command() -> Vec<String> {
  ["nix", "eval", "--raw", ".#manual.apiVersion"].map(String::from).to_vec()
}

impl Default for ProbeConfig {
  fn default() -> Self {
    Self {
      command: default_probe_command(),
    }
  }
}

/// Publish collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishConfig {
  /// Remote URL or local path (default: GitHub URL of the canonical repository)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remote: Option<String>,

  /// Environment variable holding the push token
  #[serde(default = "default_token_env")]
  pub token_env: String,

  #[serde(default = "default_author_name")]
  pub author_name: String,

  #[serde(default = "default_author_email")]
  pub author_email: String,
}

fn default_token_env() -> String {
  "GITHUB_TOKEN".to_string()
}

fn default_author_name() -> String {
  "github-actions[bot]".to_string()
}

fn default_author_email() -> String {
  "41898282+github-actions[bot]@users.noreply.github.com".to_string()
}

impl Default for PublishConfig {
  fn default() -> Self {
    Self {
      remote: None,
      token_env: default_token_env(),
      author_name: default_author_name(),
      author_email: default_author_email(),
    }
  }
}

impl PublishConfig {
  /// Remote to publish to, falling back to the canonical repository on GitHub
  pub fn remote_url(&self, gate: &GateConfig) -> String {
    self
      .remote
      .clone()
      .unwrap_or_else(|| format!("https://github.com/{}.git", gate.canonical_repository))
  }
}

impl Default for PagesConfig {
  fn default() -> Self {
    Self::new()
  }
}

impl PagesConfig {
  /// Find config file in search order: pages.toml, .pages.toml, .config/pages.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("pages.toml"),
      path.join(".pages.toml"),
      path.join(".config").join("pages.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> PagesResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::new());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| match e {
      PagesError::Config(inner) => PagesError::Config(inner),
      other => PagesError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason: other.to_string(),
      }),
    })?;

    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> PagesResult<Self> {
    let config: PagesConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Save config to pages.toml (default location)
  pub fn save(&self, path: &Path) -> PagesResult<PathBuf> {
    let config_path = path.join("pages.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(config_path)
  }

  /// Create a config with every default applied
  pub fn new() -> Self {
    Self {
      gate: GateConfig::default(),
      manual: default_manual(),
      redirect_farm: default_redirect_farm(),
      version_probe: ProbeConfig::default(),
      publish: PublishConfig::default(),
    }
  }

  /// Validate the configuration
  pub fn validate(&self) -> PagesResult<()> {
    let repo = &self.gate.canonical_repository;
    let mut parts = repo.split('/');
    let well_formed = matches!(
      (parts.next(), parts.next(), parts.next()),
      (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    );
    if !well_formed {
      return Err(PagesError::Config(ConfigError::InvalidValue {
        field: "gate.canonical_repository".to_string(),
        reason: format!("expected 'owner/name', got '{}'", repo),
      }));
    }

    if self.gate.canonical_branch.trim().is_empty() {
      return Err(PagesError::Config(ConfigError::MissingField {
        field: "gate.canonical_branch".to_string(),
      }));
    }

    for (name, build) in [("manual", &self.manual), ("redirect_farm", &self.redirect_farm)] {
      if build.command.first().is_none_or(|program| program.trim().is_empty()) {
        return Err(PagesError::Config(ConfigError::MissingField {
          field: format!("{}.command", name),
        }));
      }
      if build.output.as_os_str().is_empty() {
        return Err(PagesError::Config(ConfigError::MissingField {
          field: format!("{}.output", name),
        }));
      }
    }

    if self
      .version_probe
      .command
      .first()
      .is_none_or(|program| program.trim().is_empty())
    {
      return Err(PagesError::Config(ConfigError::MissingField {
        field: "version_probe.command".to_string(),
      }));
    }

    if self.publish.token_env.trim().is_empty() {
      return Err(PagesError::Config(ConfigError::MissingField {
        field: "publish.token_env".to_string(),
      }));
    }

    Ok(())
  }
}
