//! Layered configuration for the Tag Manager CLI
//!
//! Priority: environment variables > config file > defaults. The config
//! file lives under the platform config directory and is optional.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tagman_client_core::planner::CleanupPolicy;
use tagman_client_core::service::{DEFAULT_BASE_URL, ServiceConfig};

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    /// Connection settings for the HTTP service.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

/// Default cleanup rules; CLI flags can enable more but never disable
/// what the file enables.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CleanupConfig {
    pub delete_unused_triggers: bool,
    pub delete_unused_variables: bool,
    pub delete_tags_without_triggers: bool,
    pub ensure_user_id_field: bool,
    pub keep_variable_ids: Vec<String>,
    pub keep_tag_ids: Vec<String>,
    pub target_tag_type: String,
    pub user_id_value: String,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        let policy = CleanupPolicy::default();
        Self {
            delete_unused_triggers: false,
            delete_unused_variables: false,
            delete_tags_without_triggers: false,
            ensure_user_id_field: false,
            keep_variable_ids: Vec::new(),
            keep_tag_ids: Vec::new(),
            target_tag_type: policy.target_tag_type,
            user_id_value: policy.user_id_value,
        }
    }
}

impl CleanupConfig {
    /// Convert the file representation into a planner policy.
    pub fn policy(&self) -> CleanupPolicy {
        CleanupPolicy {
            delete_unused_triggers: self.delete_unused_triggers,
            delete_unused_variables: self.delete_unused_variables,
            delete_tags_without_triggers: self.delete_tags_without_triggers,
            ensure_user_id_field: self.ensure_user_id_field,
            keep_variable_ids: self.keep_variable_ids.iter().cloned().collect::<BTreeSet<_>>(),
            keep_tag_ids: self.keep_tag_ids.iter().cloned().collect::<BTreeSet<_>>(),
            target_tag_type: self.target_tag_type.clone(),
            user_id_value: self.user_id_value.clone(),
        }
    }
}

/// Configuration manager that handles platform paths and layered loading
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a ConfigManager with the default platform path.
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path.
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tagman/config.toml")
    }

    /// Load configuration with layered priority: ENV > File > Defaults.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed("TAGMAN_").split("__"));

        figment.extract().context("Failed to load configuration")
    }

    /// Render the effective configuration as TOML.
    pub fn show(&self) -> Result<String> {
        let config = self.load()?;
        toml::to_string_pretty(&config).context("Failed to render configuration")
    }

    /// Write a default config file unless one already exists. Returns
    /// whether a file was written.
    pub fn init(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let rendered = toml::to_string_pretty(&AppConfig::default())
            .context("Failed to render default configuration")?;
        fs::write(&self.config_path, rendered).context("Failed to write config file")?;
        Ok(true)
    }
}
