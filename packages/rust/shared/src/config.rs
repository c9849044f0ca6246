//! Application configuration for ContentHub.
//!
//! User config lives at `~/.contenthub/contenthub.toml`.
//! CLI flags override the backend URL env var, which overrides config file
//! values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ContentHubError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contenthub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contenthub";

// ---------------------------------------------------------------------------
// Config structs (matching contenthub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Workshop defaults.
    #[serde(default)]
    pub workshop: WorkshopConfig,
}

/// `[backend]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend origin, e.g. `http://localhost:8001`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix under which the JSON API is mounted.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Name of the env var that overrides `base_url` when set.
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,

    /// Request timeout. Unset means requests wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            base_url_env: default_base_url_env(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001".into()
}
fn default_api_prefix() -> String {
    "/api".into()
}
fn default_base_url_env() -> String {
    "CONTENTHUB_BACKEND_URL".into()
}

/// `[workshop]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkshopConfig {
    /// Instructions appended to every stage call when none are given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_custom_preset: Option<String>,
}

// ---------------------------------------------------------------------------
// Backend URL resolution
// ---------------------------------------------------------------------------

/// Resolve the API root URL (always ending in `/`) from flag, env and config.
pub fn resolve_api_root(config: &AppConfig, flag: Option<&str>) -> Result<Url> {
    resolve_api_root_with(config, flag, |name| std::env::var(name).ok())
}

fn resolve_api_root_with(
    config: &AppConfig,
    flag: Option<&str>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<Url> {
    let backend = &config.backend;
    let base = flag
        .map(str::to_string)
        .or_else(|| env_lookup(&backend.base_url_env).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| backend.base_url.clone());

    let prefix = backend.api_prefix.trim_matches('/');
    let joined = if prefix.is_empty() {
        format!("{}/", base.trim_end_matches('/'))
    } else {
        format!("{}/{prefix}/", base.trim_end_matches('/'))
    };

    let url = Url::parse(&joined)
        .map_err(|e| ContentHubError::config(format!("invalid backend URL '{base}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ContentHubError::config(format!(
            "backend URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    tracing::debug!(api_root = %url, "resolved backend API root");
    Ok(url)
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contenthub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentHubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contenthub/contenthub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentHubError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ContentHubError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentHubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentHubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentHubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
