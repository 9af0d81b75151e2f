//! Service process configuration, loaded from a TOML file with CLI
//! overrides. The validation configuration itself comes from the remote
//! configuration store (see `providers`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub configuration: ConfigurationSource,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationSource {
    /// Path to the validation configuration JSON document.
    #[serde(default = "default_config_document")]
    pub document_path: PathBuf,
    /// Environment variable holding the credential store API key.
    #[serde(default = "default_api_key_variable")]
    pub api_key_variable: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    8080
}
fn default_config_document() -> PathBuf {
    PathBuf::from("./validation-config.json")
}
fn default_api_key_variable() -> String {
    "EVCS_API_KEY".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for ConfigurationSource {
    fn default() -> Self {
        Self {
            document_path: default_config_document(),
            api_key_variable: default_api_key_variable(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: ServiceConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}
