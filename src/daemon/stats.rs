use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::models::StatsReport;

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    total: Duration,
}

/// Admission latency statistics. Record and report share one lock so a
/// report never sees the sum and the count out of step.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<Accumulator>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, elapsed: Duration) {
        let mut acc = self.inner.lock().await;
        acc.total += elapsed;
        acc.count += 1;
    }

    /// Record the time elapsed since `start`.
    pub async fn record_since(&self, start: Instant) {
        self.record(start.elapsed()).await;
    }

    pub async fn report(&self) -> StatsReport {
        let acc = self.inner.lock().await;
        let average = if acc.count == 0 {
            0
        } else {
            let micros = acc.total.as_micros() / u128::from(acc.count);
            u64::try_from(micros).unwrap_or(u64::MAX)
        };
        StatsReport {
            total: acc.count,
            average,
        }
    }
}
