use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::policy::{ProbeOverride, RepoSettings, WorkflowKind};

/// Main configuration structure for repoconform
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// GitHub account and endpoint settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Desired settings applied to every non-archived repository
    #[serde(default)]
    pub settings: RepoSettings,

    /// CI workflow kinds recognized when building branch protection
    #[serde(default = "default_workflows")]
    pub workflows: Vec<WorkflowKind>,

    /// Probe overrides for repositories with known-bad CI configurations
    #[serde(default)]
    pub overrides: Vec<ProbeOverride>,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Account whose repositories are reconciled (must be set)
    #[serde(default)]
    pub account: String,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Branch that receives protection rules
    #[serde(default = "default_protected_branch")]
    pub protected_branch: String,
}

// Default value functions
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_protected_branch() -> String {
    "main".to_string()
}

fn default_workflows() -> Vec<WorkflowKind> {
    vec![
        WorkflowKind::new("cicd", "cicd.yml"),
        WorkflowKind::new("tflint", "tflint.yml"),
    ]
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            api_url: default_api_url(),
            protected_branch: default_protected_branch(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            settings: RepoSettings::default(),
            workflows: default_workflows(),
            overrides: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("repoconform").join("config.yml"))
    }

    /// Validate that the configuration can drive a run.
    ///
    /// The account has no sensible default, and a workflow kind without a
    /// context or file can neither be probed nor required.
    pub fn validate(&self) -> Result<()> {
        if self.github.account.is_empty() {
            let path = Self::default_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the config file".to_string());
            bail!("github.account is not set; edit {path} or pass --config");
        }

        for workflow in &self.workflows {
            if workflow.context.is_empty() || workflow.file.is_empty() {
                bail!("workflow kinds need both a context and a file");
            }
        }

        Ok(())
    }
}
