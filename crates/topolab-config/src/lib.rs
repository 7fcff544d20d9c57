pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use topolab_cloud::{Credential, ProviderKind};

const APP_DIR: &str = "topolab";
const SETTINGS_FILE: &str = "cloud.json";

/// Topolab configuration directory, created if missing
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(APP_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Path of the cloud settings file.
///
/// 1. `TOPOLAB_CONFIG_PATH` environment variable
/// 2. `~/.config/topolab/cloud.json`
///
/// The file does not need to exist yet.
pub fn settings_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TOPOLAB_CONFIG_PATH") {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    Ok(get_config_dir()?.join(SETTINGS_FILE))
}

/// Cloud account and instance defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    pub cloud_user_name: String,
    pub cloud_api_key: String,
    /// Persist the API key when saving
    pub cloud_store_api_key: bool,
    /// Whether the user has answered the "store API key" question
    pub cloud_store_api_key_chosen: bool,
    pub cloud_provider: String,
    pub cloud_region: String,
    pub instances_per_project: u32,
    pub default_flavor: String,
    pub new_instance_flavor: String,
    pub accepted_terms: bool,
    /// Seconds to wait on a provider call
    pub instance_timeout: u64,
    pub default_image: String,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            cloud_user_name: String::new(),
            cloud_api_key: String::new(),
            cloud_store_api_key: false,
            cloud_store_api_key_chosen: false,
            cloud_provider: "rackspace".to_string(),
            cloud_region: String::new(),
            instances_per_project: 0,
            default_flavor: String::new(),
            new_instance_flavor: String::new(),
            accepted_terms: false,
            instance_timeout: 30,
            default_image: String::new(),
        }
    }
}

impl CloudSettings {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&settings_path()?)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Override fields from `TOPOLAB_CLOUD_*` environment variables.
    pub fn apply_env(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("TOPOLAB_CLOUD_USER_NAME", &mut self.cloud_user_name),
            ("TOPOLAB_CLOUD_API_KEY", &mut self.cloud_api_key),
            ("TOPOLAB_CLOUD_PROVIDER", &mut self.cloud_provider),
            ("TOPOLAB_CLOUD_REGION", &mut self.cloud_region),
        ];
        for (var, field) in overrides {
            if let Ok(value) = std::env::var(var) {
                tracing::debug!("{} overrides the settings file", var);
                *field = value;
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = settings_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`. The API key is only written when
    /// `cloud_store_api_key` is set.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut persisted = self.clone();
        if !persisted.cloud_store_api_key {
            persisted.cloud_api_key.clear();
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, serde_json::to_string_pretty(&persisted)?)?;
        tracing::debug!("Saved cloud settings to {}", path.display());
        Ok(())
    }

    pub fn provider(&self) -> Result<ProviderKind> {
        self.cloud_provider
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "cloud_provider",
                value: self.cloud_provider.clone(),
            })
    }

    pub fn credential(&self) -> Result<Credential> {
        if self.cloud_user_name.is_empty() {
            return Err(ConfigError::MissingSetting("cloud_user_name"));
        }
        if self.cloud_api_key.is_empty() {
            return Err(ConfigError::MissingSetting("cloud_api_key"));
        }
        Ok(Credential::new(&self.cloud_user_name, &self.cloud_api_key))
    }

    pub fn instance_timeout(&self) -> Duration {
        Duration::from_secs(self.instance_timeout)
    }
}
