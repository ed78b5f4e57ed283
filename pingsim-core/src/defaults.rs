use crate::measure::{Latency, PacketLoss, Probability};
use std::time::Duration;

/// Time between two probe cycles of a running session.
///
/// ```
/// # use pingsim_core::defaults::*;
/// assert_eq!(DEFAULT_PROBE_INTERVAL.as_millis(), 1_000);
/// ```
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Lower bound (inclusive) of the base round-trip time.
pub const DEFAULT_BASE_LATENCY_MIN: Latency = Latency::from_millis(10);

/// Upper bound (exclusive) of the base round-trip time.
pub const DEFAULT_BASE_LATENCY_MAX: Latency = Latency::from_millis(50);

/// Chance that a probe suffers an extra latency spike.
pub const DEFAULT_SPIKE_PROBABILITY: Probability = Probability::TENTH;

/// Upper bound (exclusive) of a latency spike.
pub const DEFAULT_SPIKE_LATENCY: Latency = Latency::from_millis(100);

/// Default loss: 2% of the probes time out.
///
/// ```
/// # use pingsim_core::defaults::*;
/// assert_eq!(DEFAULT_PACKET_LOSS.to_string(), "2%");
/// ```
pub const DEFAULT_PACKET_LOSS: PacketLoss = PacketLoss::Rate(Probability::TWO_PERCENT);

/// Payload size reported in every reply.
pub const REPLY_BYTES: u32 = 32;

/// Hop limit reported in every reply.
pub const REPLY_TTL: u8 = 64;

/// Address offered when the user has not typed anything else.
pub const DEFAULT_TARGET: &str = "8.8.8.8";
