//! Application configuration.
//!
//! kabus settings come from a JSON credentials file
//! (`$HOME/.kabuto/credentials.json` by default); paymium keys come from the
//! environment, optionally seeded from a `.env` file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradegate_core::{Credentials, ExchangeId};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Layout of the kabus credentials file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsFile {
    #[serde(rename = "KABUSAPI_HOST", default)]
    pub kabusapi_host: Option<String>,
    #[serde(rename = "KABUSAPI_LIVE_PW", default)]
    pub kabusapi_live_pw: Option<String>,
}

/// kabus gateway settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KabusSettings {
    pub host: Option<String>,
    pub password: Option<String>,
}

/// paymium API keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymiumSettings {
    pub api_key: Option<String>,
    pub secret: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub kabus: KabusSettings,
    pub paymium: PaymiumSettings,
}

impl AppConfig {
    /// Load the credentials file and the paymium environment variables.
    /// A missing credentials file is not an error; kabus calls will then
    /// fail on the missing `ipaddr` credential.
    pub fn load(credentials_path: &Path) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            info!("No .env file loaded: {}", e);
        }
        let file = read_credentials_file(credentials_path)?;
        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Combine the credentials file with variables looked up through `env`.
    pub fn from_sources(file: Option<CredentialsFile>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
        Self {
            kabus: KabusSettings {
                host: file.kabusapi_host,
                password: file.kabusapi_live_pw,
            },
            paymium: PaymiumSettings {
                api_key: non_empty("PAYMIUM_API_KEY"),
                secret: non_empty("PAYMIUM_SECRET"),
            },
        }
    }

    /// Adapter credentials for one exchange.
    pub fn credentials(&self, exchange: ExchangeId) -> Credentials {
        let mut credentials = Credentials::new();
        match exchange {
            ExchangeId::Kabus => {
                credentials.ipaddr = self.kabus.host.clone();
                credentials.password = self.kabus.password.clone();
            }
            ExchangeId::Paymium => {
                credentials.api_key = self.paymium.api_key.clone();
                credentials.secret = self.paymium.secret.clone();
            }
        }
        credentials
    }
}

/// `$HOME/.kabuto/credentials.json`.
pub fn default_credentials_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".kabuto").join("credentials.json")
}

/// Parse the credentials file; `None` when it does not exist.
pub fn read_credentials_file(path: &Path) -> Result<Option<CredentialsFile>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Credentials file {:?} not found", path);
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    info!("Loaded credentials from {:?}", path);
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
