//! Benchmark output records: the JSON report, the Markdown comparison
//! report, and the console summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::outcome::QueryOutcome;
use crate::stats::MetricStats;

pub const RETRIEVAL_METRICS: [&str; 3] = ["relevance", "coverage", "precision"];
pub const RESPONSE_METRICS: [&str; 4] = ["accuracy", "hallucination", "helpfulness", "completeness"];

/// Aggregates for one retrieval path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSummary {
    pub success: usize,
    pub failed: usize,
    pub avg_latency_ms: f64,
    pub avg_results: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<MetricStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<MetricStats>,
    pub retrieval_quality: BTreeMap<String, MetricStats>,
    pub response_quality: BTreeMap<String, MetricStats>,
    pub hallucination_records: usize,
}

impl PathSummary {
    pub fn success_rate(&self, total: usize) -> Option<f64> {
        if total == 0 {
            None
        } else {
            Some(self.success as f64 / total as f64)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerSummary {
    pub hybrid_wins: usize,
    pub keyword_wins: usize,
    pub overall: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub hybrid: PathSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<PathSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<WinnerSummary>,
}

/// The complete benchmark output record; write-once after the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub run_type: String,
    pub timestamp: String,
    pub total_queries: usize,
    pub summary: RunSummary,
    pub results: Vec<QueryOutcome>,
}

impl BenchmarkReport {
    /// Write the JSON report into `dir` with a timestamped file name and
    /// return the path.
    pub fn save_json(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("benchmark_{}.json", stamp));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Markdown comparison report generated from the same summary.
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push("# Benchmark Report".to_string());
        lines.push("## Hybrid Retrieval vs Keyword Search".to_string());
        lines.push(String::new());
        lines.push(format!("**Generated:** {}", self.timestamp));
        lines.push(format!("**Total Queries:** {}", self.total_queries));
        lines.push(String::new());

        if let Some(winner) = &self.summary.winner {
            lines.push("## Overall Result".to_string());
            lines.push(String::new());
            let verdict = match winner.overall.as_str() {
                "hybrid" => format!(
                    "**Winner:** Hybrid Retrieval - {} vs {}",
                    winner.hybrid_wins, winner.keyword_wins
                ),
                "keyword" => format!(
                    "**Winner:** Keyword Search - {} vs {}",
                    winner.keyword_wins, winner.hybrid_wins
                ),
                _ => format!(
                    "**Result:** Tie - {} vs {}",
                    winner.hybrid_wins, winner.keyword_wins
                ),
            };
            lines.push(verdict);
            lines.push(String::new());
        }

        lines.push("## Performance".to_string());
        lines.push(String::new());
        lines.push("| Metric | Hybrid | Keyword |".to_string());
        lines.push("|--------|--------|---------|".to_string());
        let hybrid = &self.summary.hybrid;
        let keyword = self.summary.keyword.as_ref();
        lines.push(format!(
            "| Success | {}/{} | {} |",
            hybrid.success,
            self.total_queries,
            keyword
                .map(|k| format!("{}/{}", k.success, self.total_queries))
                .unwrap_or_else(|| "-".to_string())
        ));
        lines.push(format!(
            "| Avg Latency | {:.0}ms | {} |",
            hybrid.avg_latency_ms,
            keyword
                .map(|k| format!("{:.0}ms", k.avg_latency_ms))
                .unwrap_or_else(|| "-".to_string())
        ));
        lines.push(format!(
            "| Avg Results | {:.1} | {} |",
            hybrid.avg_results,
            keyword
                .map(|k| format!("{:.1}", k.avg_results))
                .unwrap_or_else(|| "-".to_string())
        ));
        lines.push(String::new());

        for (title, metrics, pick) in [
            (
                "Retrieval Quality",
                &RETRIEVAL_METRICS[..],
                true,
            ),
            (
                "Response Quality",
                &RESPONSE_METRICS[..],
                false,
            ),
        ] {
            lines.push(format!("## {}", title));
            lines.push(String::new());
            lines.push("| Metric | Hybrid | Keyword |".to_string());
            lines.push("|--------|--------|---------|".to_string());
            for metric in metrics {
                let get = |s: &PathSummary| {
                    let map = if pick {
                        &s.retrieval_quality
                    } else {
                        &s.response_quality
                    };
                    map.get(*metric)
                        .map(|m| format!("{:.2}/5", m.mean))
                        .unwrap_or_else(|| "-".to_string())
                };
                lines.push(format!(
                    "| {} | {} | {} |",
                    metric,
                    get(hybrid),
                    keyword.map(get).unwrap_or_else(|| "-".to_string())
                ));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }

    pub fn save_markdown(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("comparison_report_{}.md", stamp));
        fs::write(&path, self.to_markdown())?;
        Ok(path)
    }

    /// Console summary in the same shape as the Markdown report.
    pub fn print_summary(&self) {
        let total = self.total_queries;
        let hybrid = &self.summary.hybrid;
        let keyword = self.summary.keyword.as_ref();

        println!("{}", "=".repeat(70));
        println!("BENCHMARK RESULTS");
        println!("{}", "=".repeat(70));
        println!("{:<25} {:<20} {:<20}", "Metric", "Hybrid", "Keyword");
        println!("{}", "-".repeat(65));
        println!(
            "{:<25} {:<20} {:<20}",
            "Success Rate",
            format!("{}/{}", hybrid.success, total),
            keyword
                .map(|k| format!("{}/{}", k.success, total))
                .unwrap_or_else(|| "-".to_string())
        );
        println!(
            "{:<25} {:<20} {:<20}",
            "Avg Latency",
            format!("{:.0}ms", hybrid.avg_latency_ms),
            keyword
                .map(|k| format!("{:.0}ms", k.avg_latency_ms))
                .unwrap_or_else(|| "-".to_string())
        );
        println!(
            "{:<25} {:<20} {:<20}",
            "Avg Results",
            format!("{:.1}", hybrid.avg_results),
            keyword
                .map(|k| format!("{:.1}", k.avg_results))
                .unwrap_or_else(|| "-".to_string())
        );

        for (title, metrics, retrieval) in [
            ("RETRIEVAL QUALITY", &RETRIEVAL_METRICS[..], true),
            ("RESPONSE QUALITY", &RESPONSE_METRICS[..], false),
        ] {
            let any_measured = {
                let map = if retrieval {
                    &hybrid.retrieval_quality
                } else {
                    &hybrid.response_quality
                };
                !map.is_empty()
            };
            if !any_measured {
                continue;
            }
            println!();
            println!("{}", title);
            println!("{}", "-".repeat(65));
            for metric in metrics {
                let get = |s: &PathSummary| {
                    let map = if retrieval {
                        &s.retrieval_quality
                    } else {
                        &s.response_quality
                    };
                    map.get(*metric)
                        .map(|m| format!("{:.2}/5", m.mean))
                        .unwrap_or_else(|| "-".to_string())
                };
                println!(
                    "{:<25} {:<20} {:<20}",
                    metric,
                    get(hybrid),
                    keyword.map(get).unwrap_or_else(|| "-".to_string())
                );
            }
        }

        if let Some(winner) = &self.summary.winner {
            println!();
            println!(
                "Score: Hybrid {} - {} Keyword",
                winner.hybrid_wins, winner.keyword_wins
            );
            match winner.overall.as_str() {
                "hybrid" => println!("WINNER: Hybrid Retrieval"),
                "keyword" => println!("WINNER: Keyword Search"),
                _ => println!("TIE"),
            }
        }
        println!("{}", "=".repeat(70));
    }
}
