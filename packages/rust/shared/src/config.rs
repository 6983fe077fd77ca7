//! Application configuration for brdgen.
//!
//! User config lives at `~/.brdgen/brdgen.toml`.
//! Defaults are used when the file does not exist; the API key itself is
//! never stored here — it arrives in the request document or via the env
//! var named by `api_key_env`, and is passed to the generator explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BrdError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "brdgen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".brdgen";

// ---------------------------------------------------------------------------
// Config structs (matching brdgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation collaborator settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat-completion endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the env var holding the API key (never the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    /// Parse and validate the configured endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            BrdError::config(format!("invalid generation endpoint '{}': {e}", self.endpoint))
        })
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_model() -> String {
    "gpt-4-turbo-preview".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_timeout_secs() -> u64 {
    120
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.brdgen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BrdError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.brdgen/brdgen.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| BrdError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| BrdError::config(format!("failed to parse {}: {e}", path.display())))?;

    // Reject an unusable endpoint at load time rather than mid-run.
    config.generation.endpoint_url()?;

    Ok(config)
}

/// Resolve the bearer credential for generation calls: the request-supplied
/// key wins, then the env var named by the config. An empty result is not an
/// error — the collaborator call will fail and the section falls back to
/// placeholder text.
pub fn resolve_api_key(config: &AppConfig, request_key: Option<&str>) -> String {
    if let Some(key) = request_key {
        if !key.is_empty() {
            return key.to_string();
        }
    }

    match std::env::var(&config.generation.api_key_env) {
        Ok(val) if !val.is_empty() => val,
        _ => {
            tracing::warn!(
                env_var = %config.generation.api_key_env,
                "no API key in request or environment; content sections will use fallback text"
            );
            String::new()
        }
    }
}
