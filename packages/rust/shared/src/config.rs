//! Application configuration for wikiharvest.
//!
//! User config lives at `~/.wikiharvest/wikiharvest.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{HarvestError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikiharvest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikiharvest";

/// Index page listing every IMO problem on the AoPS wiki.
pub const DEFAULT_INDEX_URL: &str =
    "https://artofproblemsolving.com/wiki/index.php/IMO_Problems_and_Solutions";

// ---------------------------------------------------------------------------
// Config structs (matching wikiharvest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run defaults.
    #[serde(default)]
    pub harvest: HarvestDefaults,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[harvest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestDefaults {
    /// Index page the item list is discovered from.
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Where the corpus JSON is written.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Number of concurrent fetch workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for HarvestDefaults {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            output_path: default_output_path(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.into()
}
fn default_output_path() -> String {
    "imo_data.json".into()
}
fn default_concurrency() -> usize {
    10
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("wikiharvest/", env!("CARGO_PKG_VERSION")).into()
}
fn default_max_redirects() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Harvest config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime harvest configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Index page URL; item locations are resolved against it.
    pub index_url: String,
    /// Output artifact path.
    pub output_path: PathBuf,
    /// Worker pool size.
    pub concurrency: usize,
    /// User-Agent header.
    pub user_agent: String,
    /// Redirect limit.
    pub max_redirects: usize,
}

impl From<&AppConfig> for HarvestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            index_url: config.harvest.index_url.clone(),
            output_path: PathBuf::from(&config.harvest.output_path),
            concurrency: config.harvest.concurrency,
            user_agent: config.http.user_agent.clone(),
            max_redirects: config.http.max_redirects,
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl HarvestConfig {
    /// Check the values a run cannot start without.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(HarvestError::config("concurrency must be at least 1"));
        }
        self.parsed_index_url()?;
        Ok(())
    }

    /// The index URL, parsed.
    pub fn parsed_index_url(&self) -> Result<Url> {
        Url::parse(&self.index_url).map_err(|e| {
            HarvestError::config(format!("invalid index_url '{}': {e}", self.index_url))
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wikiharvest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| HarvestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikiharvest/wikiharvest.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HarvestError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HarvestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HarvestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HarvestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
