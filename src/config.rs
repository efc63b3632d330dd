use crate::blocks::{FireboltCredentials, FireboltDatabase};
use crate::error::FireboltError;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "firebolt.toml";
pub const CONFIG_PATH_ENV: &str = "FIREBOLT_CONFIG";
pub const ENV_PREFIX: &str = "FIREBOLT_";

/// Connection parameters as the operator writes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub engine_name: Option<String>,
    #[serde(default)]
    pub engine_url: Option<String>,
    #[serde(default)]
    pub additional_parameters: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    #[serde(default)]
    pub credentials: FireboltCredentials,
    #[serde(default)]
    pub database: DatabaseSettings,
}

fn default_loglevel() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loglevel: default_loglevel(),
            credentials: FireboltCredentials::default(),
            database: DatabaseSettings::default(),
        }
    }
}

impl Settings {
    /// Field defaults, then the TOML file named by `FIREBOLT_CONFIG` (or
    /// `firebolt.toml`), then `FIREBOLT_*` environment variables. Nested keys
    /// use `__`, e.g. `FIREBOLT_CREDENTIALS__TOKEN`.
    pub fn load() -> Result<Self, FireboltError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, FireboltError> {
        let settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(settings)
    }

    /// Build the validated database block.
    pub fn database_block(&self) -> Result<FireboltDatabase, FireboltError> {
        let database = self.database.database.clone().ok_or_else(|| {
            FireboltError::Configuration("`database.database` is required".to_string())
        })?;
        FireboltDatabase::new(
            self.credentials.clone(),
            database,
            self.database.engine_name.clone(),
            self.database.engine_url.clone(),
            self.database.additional_parameters.clone(),
        )
    }
}
