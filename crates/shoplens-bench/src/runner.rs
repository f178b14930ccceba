//! Benchmark orchestrator.
//!
//! Drives both retrieval paths per query, synthesizes through one shared
//! call site, judges, fact-checks, and accumulates into a collector owned
//! by the run. Queries run concurrently up to a bounded limit; keyword
//! retrievals serialize on the storefront mutex because the scraping
//! collaborator is a single logical browser session. A per-query timeout
//! marks the query failed with cause "timeout"; nothing mid-pipeline is
//! cancelled individually.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Mutex;

use shoplens_core::catalog::CatalogStore;
use shoplens_core::error::Result as CoreResult;
use shoplens_core::traits::Retriever;
use shoplens_core::types::{QueryRecord, RetrievalResult};
use shoplens_eval::{check_claims, extract_claims, ItemClaim, Judge, Synthesizer};

use crate::collector::{summarize_path, RunCollector};
use crate::outcome::{PathOutcome, QueryOutcome, QueryStage};
use crate::report::{BenchmarkReport, RunSummary};
use crate::winner::tally;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub concurrency: usize,
    pub query_timeout: Duration,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            query_timeout: Duration::from_secs(60),
            show_progress: true,
        }
    }
}

pub struct BenchmarkHarness {
    catalog: Arc<CatalogStore>,
    hybrid: Arc<dyn Retriever>,
    keyword: Option<Mutex<Box<dyn Retriever>>>,
    synthesizer: Arc<dyn Synthesizer>,
    judge: Option<Judge>,
    options: RunOptions,
}

impl BenchmarkHarness {
    pub fn new(
        catalog: Arc<CatalogStore>,
        hybrid: Arc<dyn Retriever>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            catalog,
            hybrid,
            keyword: None,
            synthesizer,
            judge: None,
            options: RunOptions::default(),
        }
    }

    /// Enable the keyword baseline. The retriever goes behind a mutex: its
    /// storefront is one logical session and must not see concurrent use.
    pub fn with_keyword(mut self, keyword: Box<dyn Retriever>) -> Self {
        self.keyword = Some(Mutex::new(keyword));
        self
    }

    pub fn with_judge(mut self, judge: Judge) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn run(&self, queries: &[QueryRecord]) -> BenchmarkReport {
        let total = queries.len();
        let pb = if self.options.show_progress {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} queries {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut collector = RunCollector::new();
        let mut stream = futures::stream::iter(queries.iter().cloned().enumerate())
            .map(|(index, query)| async move {
                let outcome = match tokio::time::timeout(
                    self.options.query_timeout,
                    self.run_query(&query),
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(query = %query.id, "query timed out");
                        QueryOutcome::timed_out(
                            query.id.clone(),
                            query.text.clone(),
                            query.category,
                            self.keyword.is_some(),
                        )
                    }
                };
                (index, outcome)
            })
            .buffer_unordered(self.options.concurrency.max(1));

        while let Some((index, outcome)) = stream.next().await {
            collector.record(index, outcome);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let outcomes = collector.into_outcomes();
        let hybrid_summary = summarize_path(outcomes.iter().map(|o| &o.hybrid));
        let keyword_summary = self
            .keyword
            .is_some()
            .then(|| summarize_path(outcomes.iter().filter_map(|o| o.keyword.as_ref())));
        let winner = keyword_summary
            .as_ref()
            .map(|keyword| tally(&hybrid_summary, keyword, total));

        BenchmarkReport {
            run_type: "hybrid_vs_keyword".to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            total_queries: total,
            summary: RunSummary {
                hybrid: hybrid_summary,
                keyword: keyword_summary,
                winner,
            },
            results: outcomes,
        }
    }

    async fn run_query(&self, query: &QueryRecord) -> QueryOutcome {
        let hybrid_retrieval = self.hybrid.retrieve(query).await;
        let hybrid = self.finish_path(query, hybrid_retrieval).await;

        let keyword = match &self.keyword {
            Some(retriever) => {
                let retrieval = {
                    let guard = retriever.lock().await;
                    guard.retrieve(query).await
                };
                Some(self.finish_path(query, retrieval).await)
            }
            None => None,
        };

        QueryOutcome {
            query_id: query.id.clone(),
            query: query.text.clone(),
            category: query.category,
            hybrid,
            keyword,
        }
    }

    /// The shared tail of both paths, and the single synthesizer invocation
    /// site: identical query text and context shape regardless of path.
    async fn finish_path(
        &self,
        query: &QueryRecord,
        retrieval: CoreResult<RetrievalResult>,
    ) -> PathOutcome {
        let mut outcome = PathOutcome::pending();

        let retrieval = match retrieval {
            Ok(retrieval) => retrieval,
            Err(e) => {
                outcome.fail(e.to_string());
                return outcome;
            }
        };
        outcome.stage = QueryStage::Retrieved;

        // Context summaries come from the catalog, never from scraped text.
        // Retrieved ids missing from the catalog become existence claims so
        // the detector flags them instead of anything dropping them.
        let mut summaries: Vec<String> = Vec::new();
        let mut unknown_ids: Vec<String> = Vec::new();
        for id in &retrieval.item_ids {
            match self.catalog.get(id) {
                Some(item) => summaries.push(CatalogStore::description_of(item)),
                None => unknown_ids.push(id.clone()),
            }
        }
        outcome.retrieval = Some(retrieval);

        let answer = match self.synthesizer.generate(&query.text, &summaries).await {
            Ok(answer) => answer,
            Err(e) => {
                outcome.fail(e.to_string());
                return outcome;
            }
        };
        outcome.stage = QueryStage::Synthesized;
        outcome.answer = Some(answer.clone());

        let mut claims = extract_claims(&answer, &self.catalog);
        for id in unknown_ids {
            if !claims.iter().any(|c| c.item_id == id) {
                claims.push(ItemClaim::existence_only(id));
            }
        }
        outcome.hallucinations = check_claims(&self.catalog, &claims);

        if let Some(judge) = &self.judge {
            match judge.evaluate_retrieval(&query.text, &summaries).await {
                Ok(scores) => outcome.retrieval_scores = Some(scores),
                Err(e) => {
                    // Excluded from aggregation, not defaulted; the query
                    // itself still records.
                    tracing::warn!(query = %query.id, error = %e, "retrieval judging excluded");
                    outcome.retrieval_judge_error = Some(e.to_string());
                }
            }
            match judge.evaluate_response(&query.text, &answer, &summaries).await {
                Ok(scores) => outcome.response_scores = Some(scores),
                Err(e) => {
                    tracing::warn!(query = %query.id, error = %e, "response judging excluded");
                    outcome.response_judge_error = Some(e.to_string());
                }
            }
            outcome.stage = QueryStage::Evaluated;
        }

        outcome.stage = QueryStage::Recorded;
        outcome
    }
}
