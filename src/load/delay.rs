use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Source of the sleep-load delay, in whole seconds.
pub trait DelaySource: Send + Sync {
    fn pick(&self, range: RangeInclusive<u64>) -> u64;
}

/// Fresh entropy on every pick.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropyDelay;

impl DelaySource for EntropyDelay {
    fn pick(&self, range: RangeInclusive<u64>) -> u64 {
        rand::thread_rng().gen_range(range)
    }
}

/// Reproducible sequence from a fixed seed.
pub struct SeededDelay {
    rng: Mutex<StdRng>,
}

impl SeededDelay {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DelaySource for SeededDelay {
    fn pick(&self, range: RangeInclusive<u64>) -> u64 {
        self.rng.lock().gen_range(range)
    }
}

/// Always the same delay, clamped into the requested range.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub u64);

impl DelaySource for FixedDelay {
    fn pick(&self, range: RangeInclusive<u64>) -> u64 {
        self.0.clamp(*range.start(), *range.end())
    }
}

/// Builds the delay source for an optional configured seed.
pub fn from_seed(seed: Option<u64>) -> Box<dyn DelaySource> {
    match seed {
        Some(seed) => Box::new(SeededDelay::new(seed)),
        None => Box::new(EntropyDelay),
    }
}
