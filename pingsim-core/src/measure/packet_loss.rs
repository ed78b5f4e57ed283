use super::{Probability, ProbabilityError};
use rand_core::Rng;
use std::{fmt, str::FromStr};

/// Chance that a probe is lost and reported as a timeout.
///
/// ```
/// use pingsim_core::measure::PacketLoss;
///
/// let lossy = PacketLoss::rate(0.02).unwrap();
/// assert_eq!(lossy.to_string(), "2%");
///
/// let parsed: PacketLoss = "2%".parse().unwrap();
/// assert_eq!(parsed, lossy);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum PacketLoss {
    /// Every probe gets a reply.
    #[default]
    None,
    /// Each probe is independently lost with the given probability.
    Rate(Probability),
}

/// Error returned when parsing a [`PacketLoss`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PacketLossParseError {
    #[error("expected '%' suffix")]
    MissingSuffix,
    #[error("invalid number before '%'")]
    InvalidNumber,
    #[error("{0}")]
    OutOfRange(#[from] ProbabilityError),
}

impl PacketLoss {
    pub fn rate(rate: f64) -> Result<Self, ProbabilityError> {
        Probability::new(rate).map(PacketLoss::Rate)
    }

    /// Draw the loss decision for one probe.
    pub fn is_lost<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        match self {
            PacketLoss::None => false,
            PacketLoss::Rate(rate) => rate.sample(rng),
        }
    }
}

impl fmt::Display for PacketLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketLoss::None => f.write_str("0%"),
            PacketLoss::Rate(rate) => rate.fmt(f),
        }
    }
}

impl FromStr for PacketLoss {
    type Err = PacketLossParseError;

    /// Parses `"0%"`, `"2%"`, `"12.5%"`. The `%` suffix is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(num) = s.trim().strip_suffix('%') else {
            return Err(PacketLossParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| PacketLossParseError::InvalidNumber)?;
        if pct == 0.0 {
            return Ok(PacketLoss::None);
        }
        Ok(PacketLoss::rate(pct / 100.0)?)
    }
}
