//! # Synthetic Load Generation
//!
//! Produces wall-clock or CPU pressure on demand so autoscalers and load
//! balancer timeouts can be observed. Two kinds of load exist:
//!
//! - **Sleep**: suspends the request task for a random whole number of
//!   seconds. The worker thread is released while waiting.
//! - **Fibonacci**: computes fib(n) by naive recursion. The work is not
//!   interruptible and holds its execution context until done.
//!
//! Neither path has an internal timeout. Deadlines belong to whatever sits
//! in front of the generator.

pub mod delay;
pub mod fibonacci;

pub use delay::{DelaySource, EntropyDelay, FixedDelay, SeededDelay};
pub use fibonacci::{fib, MAX_REPRESENTABLE_FIB_INDEX};

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

use crate::{config::LoadConfig, identity::PodIdentity};

/// Kind of load that was generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadKind {
    Sleep,
    Fibonacci,
}

/// Where CPU-bound work runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuMode {
    /// On the request's own async worker. Long runs starve tasks sharing it.
    #[default]
    Inline,
    /// On tokio's blocking pool. The request still waits for completion.
    BlockingPool,
}

/// Outcome of a single load run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadResult {
    pub kind: LoadKind,
    /// Delay in seconds for sleep, Fibonacci index otherwise
    pub input: u64,
    /// fib(input); only present for Fibonacci runs
    pub output: Option<u64>,
    /// Measured wall-clock time of the run
    pub duration_seconds: f64,
    pub pod_identity: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Load task aborted: {0}")]
    Aborted(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Bounds and execution policy for the generator.
///
/// Checked by [`LoadGenerator::new`]: the sleep range must be non-empty and
/// `max_fib_index` must not exceed [`MAX_REPRESENTABLE_FIB_INDEX`].
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub sleep_range: RangeInclusive<u64>,
    pub max_fib_index: u32,
    pub cpu_mode: CpuMode,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self::from(&LoadConfig::default())
    }
}

impl From<&LoadConfig> for LoadSettings {
    fn from(cfg: &LoadConfig) -> Self {
        Self {
            sleep_range: cfg.sleep_min_secs..=cfg.sleep_max_secs,
            max_fib_index: cfg.max_fib_index,
            cpu_mode: cfg.cpu_mode,
        }
    }
}

pub struct LoadGenerator {
    delay: Box<dyn DelaySource>,
    identity: Box<dyn PodIdentity>,
    settings: LoadSettings,
}

impl LoadGenerator {
    pub fn new(
        delay: Box<dyn DelaySource>,
        identity: Box<dyn PodIdentity>,
        settings: LoadSettings,
    ) -> Result<Self, LoadError> {
        if settings.sleep_range.is_empty() {
            return Err(LoadError::InvalidSettings(format!(
                "sleep range {}..={} is empty",
                settings.sleep_range.start(),
                settings.sleep_range.end()
            )));
        }
        if settings.max_fib_index > MAX_REPRESENTABLE_FIB_INDEX {
            return Err(LoadError::InvalidSettings(format!(
                "max_fib_index {} exceeds {MAX_REPRESENTABLE_FIB_INDEX}",
                settings.max_fib_index
            )));
        }

        Ok(Self {
            delay,
            identity,
            settings,
        })
    }

    /// Runs Fibonacci load when an index is given, sleep load otherwise.
    pub async fn generate(&self, fib_index: Option<i64>) -> Result<LoadResult, LoadError> {
        match fib_index {
            Some(n) => self.generate_fibonacci_load(n).await,
            None => Ok(self.generate_sleep_load().await),
        }
    }

    /// Sleeps for a random delay drawn from the configured range.
    pub async fn generate_sleep_load(&self) -> LoadResult {
        let delay = self.delay.pick(self.settings.sleep_range.clone());

        let start = tokio::time::Instant::now();
        tokio::time::sleep(Duration::from_secs(delay)).await;
        let duration_seconds = start.elapsed().as_secs_f64();

        info!(kind = %LoadKind::Sleep, input = delay, duration_seconds, "load generated");

        LoadResult {
            kind: LoadKind::Sleep,
            input: delay,
            output: None,
            duration_seconds,
            pod_identity: self.identity.name(),
        }
    }

    /// Computes fib(n) recursively and reports how long it took.
    pub async fn generate_fibonacci_load(&self, n: i64) -> Result<LoadResult, LoadError> {
        let index = self.checked_index(n)?;

        let (output, elapsed) = match self.settings.cpu_mode {
            CpuMode::Inline => timed_fib(index),
            CpuMode::BlockingPool => tokio::task::spawn_blocking(move || timed_fib(index))
                .await
                .map_err(|e| LoadError::Aborted(e.to_string()))?,
        };
        let duration_seconds = elapsed.as_secs_f64();

        info!(kind = %LoadKind::Fibonacci, input = index, output, duration_seconds, "load generated");

        Ok(LoadResult {
            kind: LoadKind::Fibonacci,
            input: u64::from(index),
            output: Some(output),
            duration_seconds,
            pod_identity: self.identity.name(),
        })
    }

    fn checked_index(&self, n: i64) -> Result<u32, LoadError> {
        if n < 0 {
            return Err(LoadError::InvalidInput(format!(
                "Fibonacci index must be non-negative, got {n}"
            )));
        }
        let max = self.settings.max_fib_index;
        match u32::try_from(n) {
            Ok(index) if index <= max => Ok(index),
            _ => Err(LoadError::InvalidInput(format!(
                "Fibonacci index {n} exceeds the configured maximum of {max}"
            ))),
        }
    }
}

fn timed_fib(n: u32) -> (u64, Duration) {
    let start = Instant::now();
    let value = fib(n);
    (value, start.elapsed())
}
