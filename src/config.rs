use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use validator::{Validate, ValidationError};

use crate::load::{CpuMode, MAX_REPRESENTABLE_FIB_INDEX};

const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
const ENV_PREFIX: &str = "DIAG__";

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    pub app: AppConfig,
    #[validate(nested)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Outer request deadline. Unset means requests run until the load finishes.
    #[validate(range(min = 1))]
    pub request_timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub message: String,
    /// Overrides hostname lookup when set.
    pub pod_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "test-header-b".to_string(),
            message: "VPC diagnostic receiver".to_string(),
            pod_name: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_load"))]
pub struct LoadConfig {
    pub sleep_min_secs: u64,
    pub sleep_max_secs: u64,
    pub max_fib_index: u32,
    pub cpu_mode: CpuMode,
    pub random_seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            sleep_min_secs: 1,
            sleep_max_secs: 10,
            max_fib_index: 45,
            cpu_mode: CpuMode::Inline,
            random_seed: None,
        }
    }
}

fn validate_load(cfg: &LoadConfig) -> Result<(), ValidationError> {
    if cfg.sleep_min_secs > cfg.sleep_max_secs {
        return Err(ValidationError::new("sleep_min_secs must not exceed sleep_max_secs"));
    }
    if cfg.max_fib_index > MAX_REPRESENTABLE_FIB_INDEX {
        return Err(ValidationError::new("max_fib_index must fit fib(n) in u64"));
    }
    Ok(())
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(DEFAULT_CONFIG_FILE))
    }

    /// Provider chain: struct defaults, then the TOML file, then `DIAG__*` env.
    pub fn figment(config_file: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }
}
