use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project directory holding config and logs
pub const PROJECT_DIR: &str = ".im";

/// Global configuration (stored in ~/.config/issue-manager/)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Editor for briefs and documents. Falls back to $EDITOR, then vim.
    #[serde(default)]
    pub editor: Option<String>,

    /// Agent CLI used for background tasks and implementation
    #[serde(default = "default_runner_command")]
    pub runner_command: String,

    /// Model hint for commit message generation
    #[serde(default = "default_commit_model")]
    pub commit_model: String,

    /// Model hint for analyze/plan/review tasks
    #[serde(default)]
    pub analysis_model: Option<String>,

    /// Columns moved per horizontal scroll
    #[serde(default = "default_scroll_step")]
    pub scroll_step: usize,

    /// Spinner/input poll interval in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            editor: None,
            runner_command: default_runner_command(),
            commit_model: default_commit_model(),
            analysis_model: None,
            scroll_step: default_scroll_step(),
            tick_ms: default_tick_ms(),
            log_level: default_log_level(),
        }
    }
}

fn default_runner_command() -> String {
    "claude".to_string()
}

fn default_commit_model() -> String {
    "haiku".to_string()
}

fn default_scroll_step() -> usize {
    8
}

fn default_tick_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Project-specific configuration (stored in .im/config.toml)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    pub editor: Option<String>,
    pub runner_command: Option<String>,
    pub commit_model: Option<String>,
    pub analysis_model: Option<String>,
    pub scroll_step: Option<usize>,
    pub tick_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl GlobalConfig {
    /// Load global config from default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            toml::from_str(&content).context("Failed to parse global config")
        } else {
            Ok(Self::default())
        }
    }

    /// Get the path to the global config file
    /// Always uses ~/.config/issue-manager/ on all platforms
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("Could not determine home directory")?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("issue-manager")
            .join("config.toml"))
    }
}

impl ProjectConfig {
    /// Load project config from a project directory
    pub fn load(project_path: &Path) -> Result<Self> {
        let config_path = Self::config_path(project_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            toml::from_str(&content).context("Failed to parse project config")
        } else {
            Ok(Self::default())
        }
    }

    /// Save project config
    pub fn save(&self, project_path: &Path) -> Result<()> {
        let config_path = Self::config_path(project_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_path(project_path: &Path) -> PathBuf {
        project_path.join(PROJECT_DIR).join("config.toml")
    }
}

/// Directory for the session log of a project
pub fn log_dir(project_path: &Path) -> PathBuf {
    project_path.join(PROJECT_DIR)
}

/// Merged configuration (global + project)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub editor: Option<String>,
    pub runner_command: String,
    pub commit_model: String,
    pub analysis_model: Option<String>,
    pub scroll_step: usize,
    pub tick_ms: u64,
    pub log_level: String,
}

impl Default for MergedConfig {
    fn default() -> Self {
        Self::merge(&GlobalConfig::default(), &ProjectConfig::default())
    }
}

impl MergedConfig {
    /// Create merged config from global and project configs
    pub fn merge(global: &GlobalConfig, project: &ProjectConfig) -> Self {
        Self {
            editor: project.editor.clone().or_else(|| global.editor.clone()),
            runner_command: project
                .runner_command
                .clone()
                .unwrap_or_else(|| global.runner_command.clone()),
            commit_model: project
                .commit_model
                .clone()
                .unwrap_or_else(|| global.commit_model.clone()),
            analysis_model: project
                .analysis_model
                .clone()
                .or_else(|| global.analysis_model.clone()),
            // zero would make horizontal scrolling a no-op
            scroll_step: project.scroll_step.unwrap_or(global.scroll_step).max(1),
            tick_ms: project.tick_ms.unwrap_or(global.tick_ms).max(10),
            log_level: project
                .log_level
                .clone()
                .unwrap_or_else(|| global.log_level.clone()),
        }
    }
}
