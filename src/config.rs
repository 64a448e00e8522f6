//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fossa-release-groups/config.toml`
//! 3. Explicit config file (`--config <path>`)
//! 4. Environment variables: `FOSSA_RG__*` (nested keys separated by `__`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, PLACEHOLDER_MANIFEST, PLACEHOLDER_TITLE};
use crate::infrastructure::api::DEFAULT_API_URL;

const APP_NAME: &str = "fossa-release-groups";
const ENV_PREFIX: &str = "FOSSA_RG";

/// External analysis binary settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliToolConfig {
    /// Binary name or path (default: "fossa")
    pub binary: String,
    /// Flag used to pass the API key to `analyze` and `test`
    pub api_key_flag: String,
}

impl Default for CliToolConfig {
    fn default() -> Self {
        Self {
            binary: "fossa".into(),
            api_key_flag: "--fossa-api-key".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCliToolConfig {
    pub binary: Option<String>,
    pub api_key_flag: Option<String>,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub work_dir: Option<PathBuf>,
    #[serde(default)]
    pub cli: RawCliToolConfig,
}

/// Unified configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// FOSSA API base URL
    pub api_url: String,
    /// API key; the `--fossa-api-key` flag takes precedence
    pub api_key: Option<String>,
    /// Per-request timeout
    pub http_timeout_secs: u64,
    /// Directory under which the placeholder project is created
    pub work_dir: PathBuf,
    pub cli: CliToolConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            http_timeout_secs: 30,
            work_dir: PathBuf::from("."),
            cli: CliToolConfig::default(),
        }
    }
}

/// Get the XDG config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Directory holding the placeholder project.
    pub fn placeholder_dir(&self) -> PathBuf {
        self.work_dir.join(PLACEHOLDER_TITLE)
    }

    /// Empty manifest inside the placeholder directory.
    pub fn placeholder_manifest(&self) -> PathBuf {
        self.placeholder_dir().join(PLACEHOLDER_MANIFEST)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.work_dir.to_string_lossy().as_ref());
        self.work_dir = PathBuf::from(expanded);
        self.cli.binary = expand_env_vars(&self.cli.binary);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_url: overlay
                .api_url
                .clone()
                .unwrap_or_else(|| self.api_url.clone()),
            api_key: overlay.api_key.clone().or_else(|| self.api_key.clone()),
            http_timeout_secs: overlay.http_timeout_secs.unwrap_or(self.http_timeout_secs),
            work_dir: overlay
                .work_dir
                .clone()
                .unwrap_or_else(|| self.work_dir.clone()),
            cli: CliToolConfig {
                binary: overlay
                    .cli
                    .binary
                    .clone()
                    .unwrap_or_else(|| self.cli.binary.clone()),
                api_key_flag: overlay
                    .cli
                    .api_key_flag
                    .clone()
                    .unwrap_or_else(|| self.cli.api_key_flag.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply FOSSA_RG__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("api_url") {
            settings.api_url = val;
        }
        if let Ok(val) = config.get_string("api_key") {
            settings.api_key = Some(val);
        }
        if let Ok(val) = config.get_int("http_timeout_secs") {
            settings.http_timeout_secs = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("http_timeout_secs must be non-negative, got {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("work_dir") {
            settings.work_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("cli.binary") {
            settings.cli.binary = val;
        }
        if let Ok(val) = config.get_string("cli.api_key_flag") {
            settings.cli.api_key_flag = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML, with the API key masked.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        let mut shown = self.clone();
        shown.api_key = shown.api_key.as_deref().map(mask_secret);
        toml::to_string_pretty(&shown).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# fossa-release-groups configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/fossa-release-groups/config.toml
#   Explicit: --config <path>
#   Env:      FOSSA_RG__* environment variables (e.g. FOSSA_RG__CLI__BINARY)
#
# The --fossa-api-key flag / FOSSA_API_KEY always wins over api_key.

# FOSSA API base URL
# api_url = "https://app.fossa.com/api"

# API key (prefer FOSSA_API_KEY in the environment)
# api_key = "..."

# Per-request timeout in seconds
# http_timeout_secs = 30

# Where the placeholder project directory is created
# work_dir = "."

[cli]
# Analysis binary
# binary = "fossa"

# Flag passing the API key to `analyze` and `test`
# api_key_flag = "--fossa-api-key"
"#
        .to_string()
    }
}

/// Keep the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".into();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
