//! Probe targets: dotted-quad IPv4 addresses and (loosely) hostnames.
//!
//! The acceptance policy is deliberately permissive and shape based. No
//! name resolution happens here, IPv6 is not recognised and there are no
//! length limits:
//!
//! 1. an empty input is rejected;
//! 2. four dot separated groups of 1 to 3 ASCII digits form a dotted quad.
//!    It is accepted only if every group is in `0..=255`. A dotted quad
//!    with an out of range group is rejected outright, the hostname rule
//!    is never consulted for it;
//! 3. anything else must look like a hostname: one or more characters out
//!    of `[a-zA-Z0-9.-]`, a `.`, then at least two ASCII letters.

use std::{fmt, str::FromStr};
use thiserror::Error;

const MAX_OCTET: u16 = 255;
const MIN_TLD_LEN: usize = 2;

/// A target accepted by [`is_valid_target`].
///
/// The original spelling is preserved: `010.0.0.1` stays `010.0.0.1`.
///
/// ```
/// # use pingsim_core::target::{Target, TargetKind};
/// let target: Target = "8.8.8.8".parse().unwrap();
/// assert_eq!(target.kind(), TargetKind::Ipv4);
/// assert_eq!(target.as_str(), "8.8.8.8");
///
/// assert!("999.1.1.1".parse::<Target>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    address: String,
    kind: TargetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Ipv4,
    Hostname,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("empty target")]
    Empty,
    #[error("octet {position} of {address:?} is out of range ({value} > 255)")]
    OctetOutOfRange {
        address: String,
        position: usize,
        value: u16,
    },
    #[error("{0:?} is neither a dotted-quad address nor a hostname")]
    Malformed(String),
}

/// `true` if `target` would be accepted by [`Target::parse`].
///
/// ```
/// # use pingsim_core::target::is_valid_target;
/// assert!(is_valid_target("192.168.1.1"));
/// assert!(is_valid_target("google.com"));
/// assert!(!is_valid_target("invalid"));
/// assert!(!is_valid_target("256.0.0.1"));
/// ```
pub fn is_valid_target(target: &str) -> bool {
    classify(target).is_ok()
}

/// Same as [`is_valid_target`] with an absent target always invalid.
pub fn is_valid_target_opt(target: Option<&str>) -> bool {
    target.is_some_and(is_valid_target)
}

impl Target {
    pub fn parse(target: &str) -> Result<Self, TargetError> {
        let kind = classify(target).inspect_err(|error| {
            log::debug!("rejected probe target: {error}");
        })?;

        Ok(Self {
            address: target.to_owned(),
            kind,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.address
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

fn classify(target: &str) -> Result<TargetKind, TargetError> {
    if target.is_empty() {
        return Err(TargetError::Empty);
    }

    if let Some(octets) = dotted_quad(target) {
        // the shape matched: range check decides, no hostname fallback
        for (position, octet) in octets.iter().enumerate() {
            let value = octet_value(octet);
            if value > MAX_OCTET {
                return Err(TargetError::OctetOutOfRange {
                    address: target.to_owned(),
                    position,
                    value,
                });
            }
        }
        return Ok(TargetKind::Ipv4);
    }

    if looks_like_hostname(target) {
        Ok(TargetKind::Hostname)
    } else {
        Err(TargetError::Malformed(target.to_owned()))
    }
}

/// split `target` in its four groups if it has the dotted-quad shape
fn dotted_quad(target: &str) -> Option<[&str; 4]> {
    let mut groups = target.split('.');
    let mut octets = [""; 4];
    for octet in &mut octets {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = group;
    }

    groups.next().is_none().then_some(octets)
}

/// at most 3 ASCII digits, so this never overflows a `u16`
fn octet_value(octet: &str) -> u16 {
    octet
        .bytes()
        .fold(0, |acc, digit| acc * 10 + u16::from(digit - b'0'))
}

fn looks_like_hostname(target: &str) -> bool {
    let allowed = |b: u8| b.is_ascii_alphanumeric() || b == b'.' || b == b'-';
    if !target.bytes().all(allowed) {
        return false;
    }

    // the top level label has no dot, so the separating `.` is the last one
    let Some((name, tld)) = target.rsplit_once('.') else {
        return false;
    };

    !name.is_empty() && tld.len() >= MIN_TLD_LEN && tld.bytes().all(|b| b.is_ascii_alphabetic())
}
