//! Per-metric point tally between the two paths.
//!
//! Every metric measured on both paths contributes exactly one point to
//! whichever path has the strictly better aggregate; an exact tie on a
//! metric awards no point, and an unmeasured metric (no aggregate on one
//! side, e.g. every judge parse failed) is skipped. An equal final point
//! count is reported as a tie, never broken arbitrarily.

use crate::report::{PathSummary, WinnerSummary, RESPONSE_METRICS, RETRIEVAL_METRICS};

pub fn tally(hybrid: &PathSummary, keyword: &PathSummary, total_queries: usize) -> WinnerSummary {
    // (hybrid value, keyword value, higher is better)
    let mut comparisons: Vec<(Option<f64>, Option<f64>, bool)> = vec![
        (
            hybrid.success_rate(total_queries),
            keyword.success_rate(total_queries),
            true,
        ),
        (
            hybrid.latency_ms.as_ref().map(|m| m.mean),
            keyword.latency_ms.as_ref().map(|m| m.mean),
            false,
        ),
        (
            hybrid.result_count.as_ref().map(|m| m.mean),
            keyword.result_count.as_ref().map(|m| m.mean),
            true,
        ),
    ];
    for metric in RETRIEVAL_METRICS {
        comparisons.push((
            hybrid.retrieval_quality.get(metric).map(|m| m.mean),
            keyword.retrieval_quality.get(metric).map(|m| m.mean),
            true,
        ));
    }
    for metric in RESPONSE_METRICS {
        comparisons.push((
            hybrid.response_quality.get(metric).map(|m| m.mean),
            keyword.response_quality.get(metric).map(|m| m.mean),
            true,
        ));
    }

    let mut hybrid_wins = 0usize;
    let mut keyword_wins = 0usize;
    for (h, k, higher_is_better) in comparisons {
        let (Some(h), Some(k)) = (h, k) else {
            continue;
        };
        if h == k {
            continue;
        }
        let hybrid_better = if higher_is_better { h > k } else { h < k };
        if hybrid_better {
            hybrid_wins += 1;
        } else {
            keyword_wins += 1;
        }
    }

    let overall = match hybrid_wins.cmp(&keyword_wins) {
        std::cmp::Ordering::Greater => "hybrid",
        std::cmp::Ordering::Less => "keyword",
        std::cmp::Ordering::Equal => "tie",
    };
    WinnerSummary {
        hybrid_wins,
        keyword_wins,
        overall: overall.to_string(),
    }
}
