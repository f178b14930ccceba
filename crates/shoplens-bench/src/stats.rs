//! Aggregate statistics over per-query measurements.

use serde::{Deserialize, Serialize};

/// Summary statistics for one metric on one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl MetricStats {
    /// `None` for an empty measurement set: an unmeasured metric stays
    /// unmeasured instead of pretending to be zero.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let sum: f64 = sorted.iter().sum();
        let mean = sum / sorted.len() as f64;

        let median = if sorted.len() % 2 == 1 {
            sorted[sorted.len() / 2]
        } else {
            let hi = sorted.len() / 2;
            (sorted[hi - 1] + sorted[hi]) / 2.0
        };

        let variance: f64 =
            sorted.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / sorted.len() as f64;
        let std_dev = variance.sqrt();

        Some(Self {
            mean,
            median,
            std_dev,
            min,
            max,
            count: sorted.len(),
        })
    }
}
