use anyhow::{Result, anyhow, bail, ensure};
use core::fmt;
use logos::{Lexer, Logos};
use std::{str::FromStr, time};

/// A [`std::time::Duration`] with a compact, human readable form.
///
/// Used wherever a duration comes from a person rather than from code:
/// probe intervals, run durations and latency bounds.
///
/// ```
/// # use pingsim_core::time::Duration;
/// let interval: Duration = "1s 500ms".parse().unwrap();
/// assert_eq!(interval.into_duration().as_millis(), 1_500);
/// assert_eq!(interval.to_string(), "1.5s");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(time::Duration);

impl Duration {
    pub const fn new(dur: time::Duration) -> Self {
        Self(dur)
    }

    #[inline]
    pub const fn into_duration(self) -> time::Duration {
        self.0
    }
}

impl From<time::Duration> for Duration {
    fn from(value: time::Duration) -> Self {
        Self(value)
    }
}

impl From<Duration> for time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <time::Duration as fmt::Debug>::fmt(&self.0, f)
    }
}

impl FromStr for Duration {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<Token>::new(s);
        let mut total = time::Duration::ZERO;
        let mut parts = 0;

        while let Some(next) = lex.next() {
            let token = next.map_err(|()| anyhow!("Failed to parse duration: {s:?}"))?;
            ensure!(
                token == Token::Value,
                "Expecting duration to start with a number. Cannot parse {s:?}"
            );
            let number: u64 = lex.slice().parse()?;

            let Some(Ok(unit)) = lex.next() else {
                bail!("Expecting a unit after {number}, failed to parse: {s:?}")
            };
            let part = match unit {
                Token::NanoSeconds => time::Duration::from_nanos(number),
                Token::MicroSeconds => time::Duration::from_micros(number),
                Token::MilliSeconds => time::Duration::from_millis(number),
                Token::Seconds => time::Duration::from_secs(number),
                Token::Minutes => number
                    .checked_mul(60)
                    .map(time::Duration::from_secs)
                    .ok_or_else(|| anyhow!("Duration overflow: {s:?}"))?,
                Token::Hours => number
                    .checked_mul(3_600)
                    .map(time::Duration::from_secs)
                    .ok_or_else(|| anyhow!("Duration overflow: {s:?}"))?,
                Token::Value => bail!("Failed to parse {s:?}, expecting a unit."),
            };
            total = total
                .checked_add(part)
                .ok_or_else(|| anyhow!("Duration overflow: {s:?}"))?;
            parts += 1;
        }

        ensure!(parts > 0, "Empty duration");
        Ok(Self(total))
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum Token {
    #[token("ns")]
    NanoSeconds,
    #[regex("us|μs|µs")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,
    #[token("m")]
    Minutes,
    #[token("h")]
    Hours,

    #[regex("[0-9]+")]
    Value,
}
