//! Run collector: the only mutable accumulation state in the pipeline.
//!
//! Owned by the run function, appended to once per completed query, and
//! consumed into the final report. No process-wide state.

use std::collections::BTreeMap;

use crate::outcome::{PathOutcome, QueryOutcome};
use crate::report::{PathSummary, RESPONSE_METRICS, RETRIEVAL_METRICS};
use crate::stats::MetricStats;

#[derive(Debug, Default)]
pub struct RunCollector {
    outcomes: Vec<(usize, QueryOutcome)>,
}

impl RunCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// One append per completed query; `index` restores input order in the
    /// report when queries finish out of order.
    pub fn record(&mut self, index: usize, outcome: QueryOutcome) {
        self.outcomes.push((index, outcome));
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_outcomes(mut self) -> Vec<QueryOutcome> {
        self.outcomes.sort_by_key(|(i, _)| *i);
        self.outcomes.into_iter().map(|(_, o)| o).collect()
    }
}

/// Aggregate one path's outcomes. Failed queries count toward `failed` and
/// contribute nothing to any aggregate.
pub fn summarize_path<'a, I>(outcomes: I) -> PathSummary
where
    I: Iterator<Item = &'a PathOutcome>,
{
    let mut success = 0usize;
    let mut failed = 0usize;
    let mut latencies: Vec<f64> = Vec::new();
    let mut result_counts: Vec<f64> = Vec::new();
    let mut retrieval_metrics: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut response_metrics: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut hallucination_records = 0usize;

    for outcome in outcomes {
        if outcome.succeeded() {
            success += 1;
        } else {
            failed += 1;
            continue;
        }
        if let Some(retrieval) = &outcome.retrieval {
            latencies.push(retrieval.latency_ms as f64);
            result_counts.push(retrieval.item_ids.len() as f64);
        }
        if let Some(scores) = &outcome.retrieval_scores {
            for (name, value) in [
                ("relevance", scores.relevance),
                ("coverage", scores.coverage),
                ("precision", scores.precision),
            ] {
                retrieval_metrics.entry(name).or_default().push(value as f64);
            }
        }
        if let Some(scores) = &outcome.response_scores {
            for (name, value) in [
                ("accuracy", scores.accuracy),
                ("hallucination", scores.hallucination),
                ("helpfulness", scores.helpfulness),
                ("completeness", scores.completeness),
            ] {
                response_metrics.entry(name).or_default().push(value as f64);
            }
        }
        hallucination_records += outcome.hallucinations.len();
    }

    let to_stats = |metrics: BTreeMap<&str, Vec<f64>>, names: &[&str]| {
        let mut out = BTreeMap::new();
        for name in names {
            if let Some(stats) = metrics.get(name).and_then(|v| MetricStats::from_values(v)) {
                out.insert(name.to_string(), stats);
            }
        }
        out
    };

    let latency_stats = MetricStats::from_values(&latencies);
    let count_stats = MetricStats::from_values(&result_counts);
    PathSummary {
        success,
        failed,
        avg_latency_ms: latency_stats.as_ref().map(|s| s.mean).unwrap_or(0.0),
        avg_results: count_stats.as_ref().map(|s| s.mean).unwrap_or(0.0),
        latency_ms: latency_stats,
        result_count: count_stats,
        retrieval_quality: to_stats(retrieval_metrics, &RETRIEVAL_METRICS),
        response_quality: to_stats(response_metrics, &RESPONSE_METRICS),
        hallucination_records,
    }
}
