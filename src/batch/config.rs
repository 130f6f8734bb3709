//! Batch buffer configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Item count used when `flush_count` is unset.
pub const DEFAULT_FLUSH_COUNT: usize = 1024;

/// Interval used when `flush_interval` is unset.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

const ENV_FLUSH_INTERVAL_MS: &str = "BATCH_BUFFER_FLUSH_INTERVAL_MS";
const ENV_FLUSH_COUNT: &str = "BATCH_BUFFER_FLUSH_COUNT";

/// User-facing configuration.
///
/// `None` means "unset" and resolves to the default. An explicit zero is kept
/// as is and makes every submission flush immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchBufferConfig {
    /// Minimum time between flushes that do not reach `flush_count`.
    pub flush_interval: Option<Duration>,
    /// Number of pending items that forces an immediate flush.
    pub flush_count: Option<usize>,
}

impl BatchBufferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    pub fn with_flush_count(mut self, count: usize) -> Self {
        self.flush_count = Some(count);
        self
    }

    /// Build a config from `BATCH_BUFFER_FLUSH_INTERVAL_MS` and
    /// `BATCH_BUFFER_FLUSH_COUNT`. Missing variables stay unset.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this config.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(ms) = parse_env::<u64>(ENV_FLUSH_INTERVAL_MS)? {
            self.flush_interval = Some(Duration::from_millis(ms));
        }
        if let Some(count) = parse_env::<usize>(ENV_FLUSH_COUNT)? {
            self.flush_count = Some(count);
        }
        Ok(self)
    }

    /// Resolve unset fields to their defaults.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            flush_interval: self.flush_interval.unwrap_or(DEFAULT_FLUSH_INTERVAL),
            flush_count: self.flush_count.unwrap_or(DEFAULT_FLUSH_COUNT),
        }
    }
}

fn parse_env<V: std::str::FromStr>(key: &str) -> Result<Option<V>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<V>().map(Some).map_err(|_| {
            Error::configuration(format!("{} must be a non-negative integer, got {:?}", key, raw))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(Error::configuration(format!("{} is not valid unicode", key)))
        }
    }
}

/// Resolved, immutable flush thresholds of one buffer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub flush_interval: Duration,
    pub flush_count: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        BatchBufferConfig::default().thresholds()
    }
}

impl From<BatchBufferConfig> for Thresholds {
    fn from(config: BatchBufferConfig) -> Self {
        config.thresholds()
    }
}
