use crate::{
    defaults,
    measure::{Latency, PacketLoss, Probability, unit_interval},
};
use chrono::{DateTime, Utc};
use rand_core::Rng;
use std::ops::Range;

/// How simulated probes behave: their round-trip time and how often they
/// are lost.
///
/// A probe's latency is a base delay drawn uniformly from
/// [`ProbeModel::base_latency`], plus, with [`ProbeModel::spike_probability`],
/// an extra delay drawn uniformly from `[0, spike_latency)`. The sum is
/// rounded to the nearest millisecond. Loss is drawn independently of the
/// latency.
///
/// ## Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | base latency | `10ms..50ms` |
/// | spike probability | 10% |
/// | spike latency | `< 100ms` |
/// | packet loss | 2% |
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeModel {
    pub base_latency: Range<Latency>,
    pub spike_probability: Probability,
    pub spike_latency: Latency,
    pub loss: PacketLoss,
}

/// The random part of a probe, decided when the probe is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeDraw {
    /// reported round-trip time, and how long the probe takes to resolve
    pub latency: Latency,
    pub lost: bool,
}

/// A resolved probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub success: bool,
    pub latency: Latency,
    pub observed_at: DateTime<Utc>,
}

impl ProbeModel {
    /// A model with no randomness: every probe replies after `latency`.
    pub fn constant(latency: Latency) -> Self {
        Self {
            base_latency: latency..latency,
            spike_probability: Probability::NEVER,
            spike_latency: Latency::ZERO,
            loss: PacketLoss::None,
        }
    }

    pub fn with_loss(mut self, loss: PacketLoss) -> Self {
        self.loss = loss;
        self
    }

    /// Longest latency [`ProbeModel::simulate`] may ever return.
    pub fn max_latency(&self) -> Latency {
        let base = self.base_latency.start.max(self.base_latency.end);
        Latency::from_millis(base.as_millis().saturating_add(self.spike_latency.as_millis()))
    }

    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> ProbeDraw {
        let min = self.base_latency.start.as_millis() as f64;
        let span = self
            .base_latency
            .end
            .as_millis()
            .saturating_sub(self.base_latency.start.as_millis()) as f64;
        let base = min + unit_interval(rng) * span;

        let spike = if self.spike_probability.sample(rng) {
            unit_interval(rng) * self.spike_latency.as_millis() as f64
        } else {
            0.0
        };

        let latency = Latency::from_millis_f64(base + spike);
        let lost = self.loss.is_lost(rng);

        ProbeDraw { latency, lost }
    }
}

impl Default for ProbeModel {
    fn default() -> Self {
        Self {
            base_latency: defaults::DEFAULT_BASE_LATENCY_MIN..defaults::DEFAULT_BASE_LATENCY_MAX,
            spike_probability: defaults::DEFAULT_SPIKE_PROBABILITY,
            spike_latency: defaults::DEFAULT_SPIKE_LATENCY,
            loss: defaults::DEFAULT_PACKET_LOSS,
        }
    }
}

impl ProbeDraw {
    pub fn resolve(self, observed_at: DateTime<Utc>) -> ProbeOutcome {
        ProbeOutcome {
            success: !self.lost,
            latency: self.latency,
            observed_at,
        }
    }
}

impl ProbeOutcome {
    pub fn observed_at_epoch_ms(&self) -> i64 {
        self.observed_at.timestamp_millis()
    }
}
