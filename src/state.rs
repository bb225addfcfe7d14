use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::identity::{HostnameIdentity, PodIdentity, StaticIdentity};
use crate::load::{delay, LoadGenerator, LoadSettings};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub generator: Arc<LoadGenerator>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let identity: Box<dyn PodIdentity> = match &cfg.app.pod_name {
            Some(name) => Box::new(StaticIdentity(name.clone())),
            None => Box::new(HostnameIdentity::detect()),
        };

        let generator = LoadGenerator::new(
            delay::from_seed(cfg.load.random_seed),
            identity,
            LoadSettings::from(&cfg.load),
        )?;

        Ok(Self::with_generator(cfg, generator))
    }

    pub fn with_generator(cfg: Config, generator: LoadGenerator) -> Self {
        Self {
            cfg: Arc::new(cfg),
            generator: Arc::new(generator),
        }
    }
}
