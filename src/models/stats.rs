use serde::{Deserialize, Serialize};

/// Snapshot of admission latency statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total: u64,
    /// Mean admission latency in microseconds.
    pub average: u64,
}
