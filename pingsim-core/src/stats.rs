use crate::target::Target;
use chrono::{DateTime, Utc};

/// Snapshot returned when a session stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub target: Target,
    /// number of probe cycles issued during the session
    pub packets_transmitted: u64,
    pub timestamp: DateTime<Utc>,
}
