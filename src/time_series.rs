use serde::{Deserialize, Serialize};

/// One per-second point of the speed trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Elapsed whole seconds since the session started
    pub time: u64,
    /// Instantaneous characters per minute over the last second
    pub cpm: u32,
    pub accuracy: u32,
}

impl MetricSample {
    pub fn new(time: u64, cpm: u32, accuracy: u32) -> Self {
        Self {
            time,
            cpm,
            accuracy,
        }
    }
}

impl From<MetricSample> for (f64, f64) {
    fn from(p: MetricSample) -> Self {
        (p.time as f64, p.cpm as f64)
    }
}
