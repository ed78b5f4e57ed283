use pingsim_core::{ProbeModel, defaults::DEFAULT_PROBE_INTERVAL};
use std::time::Duration;

/// Shortest accepted probe interval; a zero period would spin.
pub const MIN_PROBE_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration of a [`ProbeSession`](crate::ProbeSession).
///
/// ```
/// # use pingsim::SessionConfig;
/// # use std::time::Duration;
/// let config = SessionConfig::default().with_seed(7);
/// assert_eq!(config.interval, Duration::from_secs(1));
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// time between two probe cycles
    pub interval: Duration,
    pub model: ProbeModel,
    /// seed of the session's random generator. Without one the generator
    /// is seeded from the wall clock and runs are not reproducible.
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_model(mut self, model: ProbeModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_PROBE_INTERVAL)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROBE_INTERVAL,
            model: ProbeModel::default(),
            seed: None,
        }
    }
}
