//! Per-query pipeline outcomes.
//!
//! Each query advances one-way through
//! `pending → retrieved → synthesized → evaluated → recorded`; a stage
//! failure jumps straight to `failed` with a recorded cause. Stages are
//! tracked per path since the keyword path can fail while the hybrid path
//! completes (and vice versa). A judge-parse failure is not a stage
//! failure: the metric set is simply absent.

use serde::{Deserialize, Serialize};

use shoplens_core::types::{
    HallucinationRecord, QueryCategory, ResponseScores, RetrievalResult, RetrievalScores,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStage {
    Pending,
    Retrieved,
    Synthesized,
    Evaluated,
    Recorded,
    Failed,
}

/// Outcome of one retrieval path for one query. Fields fill in as the path
/// advances; whatever was produced before a failure is kept for post-hoc
/// inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathOutcome {
    pub stage: QueryStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<RetrievalResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_scores: Option<RetrievalScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_scores: Option<ResponseScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_judge_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_judge_error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hallucinations: Vec<HallucinationRecord>,
}

impl PathOutcome {
    pub fn pending() -> Self {
        Self {
            stage: QueryStage::Pending,
            error: None,
            retrieval: None,
            answer: None,
            retrieval_scores: None,
            response_scores: None,
            retrieval_judge_error: None,
            response_judge_error: None,
            hallucinations: Vec::new(),
        }
    }

    pub fn fail(&mut self, cause: impl Into<String>) {
        self.stage = QueryStage::Failed;
        self.error = Some(cause.into());
    }

    pub fn succeeded(&self) -> bool {
        self.stage == QueryStage::Recorded
    }
}

/// Full outcome for one query across both paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub query_id: String,
    pub query: String,
    pub category: QueryCategory,
    pub hybrid: PathOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<PathOutcome>,
}

impl QueryOutcome {
    pub fn timed_out(
        query_id: impl Into<String>,
        query: impl Into<String>,
        category: QueryCategory,
        keyword_enabled: bool,
    ) -> Self {
        let mut hybrid = PathOutcome::pending();
        hybrid.fail("timeout");
        let keyword = keyword_enabled.then(|| {
            let mut k = PathOutcome::pending();
            k.fail("timeout");
            k
        });
        Self {
            query_id: query_id.into(),
            query: query.into(),
            category,
            hybrid,
            keyword,
        }
    }
}
