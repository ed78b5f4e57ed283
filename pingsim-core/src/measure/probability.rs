use rand_core::Rng;
use std::fmt;

/// A validated probability in `[0.0, 1.0]`.
///
/// ```
/// # use pingsim_core::measure::Probability;
/// let spike = Probability::new(0.1).unwrap();
/// assert_eq!(spike.value(), 0.1);
/// assert!(Probability::new(1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

/// Error returned when building a [`Probability`] outside `[0.0, 1.0]`
/// (NaN included).
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("probability must be in [0.0, 1.0], got {0}")]
pub struct ProbabilityError(f64);

impl Probability {
    pub const NEVER: Self = Self(0.0);
    pub const ALWAYS: Self = Self(1.0);
    pub(crate) const TENTH: Self = Self(0.1);
    pub(crate) const TWO_PERCENT: Self = Self(0.02);

    pub fn new(value: f64) -> Result<Self, ProbabilityError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ProbabilityError(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Draw once: `true` with probability [`Probability::value`].
    ///
    /// [`Probability::ALWAYS`] is always `true` since the draw is taken
    /// from `[0.0, 1.0)`.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        unit_interval(rng) < self.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        if pct.fract() == 0.0 {
            write!(f, "{}%", pct as u64)
        } else {
            write!(f, "{pct:.2}%")
        }
    }
}

/// uniform `f64` in `[0.0, 1.0)` built from the 53 high bits of a `u64`
pub(crate) fn unit_interval<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
    (rng.next_u64() >> 11) as f64 * SCALE
}
