use std::{fmt, str::FromStr, time::Duration};

/// Round-trip time of a single probe, in whole milliseconds.
///
/// Probe replies report their latency the way `ping` does (`time=23ms`),
/// so the value is kept at millisecond precision. Building a [`Latency`]
/// from a [`Duration`] truncates anything below the millisecond.
///
/// ```
/// # use pingsim_core::measure::Latency;
/// # use std::time::Duration;
/// let latency = Latency::new(Duration::from_micros(23_999));
/// assert_eq!(latency.as_millis(), 23);
/// assert_eq!(latency.to_string(), "23ms");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Latency(u64);

impl Latency {
    /// No latency at all.
    pub const ZERO: Self = Self(0);

    #[inline(always)]
    pub const fn new(duration: Duration) -> Self {
        Self(duration.as_millis() as u64)
    }

    #[inline(always)]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// round a fractional amount of milliseconds to the nearest
    /// millisecond. Negative and NaN values collapse to [`Latency::ZERO`].
    pub(crate) fn from_millis_f64(millis: f64) -> Self {
        // `as` saturates: NaN and negatives become 0
        Self(millis.round() as u64)
    }

    #[inline(always)]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn into_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl From<Latency> for Duration {
    fn from(value: Latency) -> Self {
        value.into_duration()
    }
}

impl From<Duration> for Latency {
    fn from(value: Duration) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl FromStr for Latency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration = crate::time::Duration::from_str(s)?;

        Ok(Self::new(duration.into_duration()))
    }
}
