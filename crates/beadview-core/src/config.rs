use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;

/// Per-project settings read from `.beadview/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

/// Node dimensions and spacing handed to the layout engine.
///
/// Epics render larger than tasks, so the two get separate size hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_epic_width")]
    pub epic_width: f64,
    #[serde(default = "default_epic_height")]
    pub epic_height: f64,
    #[serde(default = "default_task_width")]
    pub task_width: f64,
    #[serde(default = "default_task_height")]
    pub task_height: f64,
    #[serde(default = "default_rank_gap")]
    pub rank_gap: f64,
    #[serde(default = "default_node_gap")]
    pub node_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            epic_width: default_epic_width(),
            epic_height: default_epic_height(),
            task_width: default_task_width(),
            task_height: default_task_height(),
            rank_gap: default_rank_gap(),
            node_gap: default_node_gap(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Collapse every epic when the caller names no explicit roots.
    #[serde(default)]
    pub collapse_epics: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
}

/// Location of the project config relative to `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".beadview/config.toml")
}

/// Load `.beadview/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    load_toml_or_default(&project_config_path(project_root))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    load_toml_or_default(&config_dir.join("beadview/config.toml"))
}

/// Resolve project and user configuration together.
///
/// # Errors
///
/// Propagates read/parse failures from either config file.
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;
    tracing::debug!(?project, ?user, "resolved configuration");
    Ok(EffectiveConfig { project, user })
}

/// Normalize an output-mode string from env or config.
///
/// Returns `None` for unrecognized values so callers fall through to the next
/// source in precedence order.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn load_toml_or_default<T>(path: &Path) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<T>(&content).with_context(|| {
        format!(
            "{}: failed to parse {}",
            ErrorCode::ConfigParseError,
            path.display()
        )
    })
}

const fn default_epic_width() -> f64 {
    240.0
}

const fn default_epic_height() -> f64 {
    72.0
}

const fn default_task_width() -> f64 {
    180.0
}

const fn default_task_height() -> f64 {
    48.0
}

const fn default_rank_gap() -> f64 {
    80.0
}

const fn default_node_gap() -> f64 {
    24.0
}
