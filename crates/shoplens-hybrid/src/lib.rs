//! Hybrid retrieval: nearest-neighbor candidates narrowed by exact symbolic
//! attribute constraints.
//!
//! Pipeline per query: wide vector search (headroom above the final cap) →
//! triple-store enrichment per candidate → hard `required_attributes`
//! filter → re-rank survivors by original similarity → truncate. When the
//! filter eliminates everything the result is empty; there is no fallback
//! to unfiltered candidates, which is what gives the precision guarantee
//! its teeth.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use shoplens_core::error::Result;
use shoplens_core::traits::Retriever;
use shoplens_core::types::{AttrValue, QueryRecord, RetrievalPath, RetrievalResult};
use shoplens_symbolic::TripleStore;
use shoplens_vector::{EmbeddingIndex, ScoredItem};

pub struct HybridRetriever {
    index: EmbeddingIndex,
    triples: Arc<TripleStore>,
    k_wide: usize,
    cap: usize,
}

impl HybridRetriever {
    pub fn new(index: EmbeddingIndex, triples: Arc<TripleStore>, k_wide: usize, cap: usize) -> Self {
        assert!(k_wide >= cap, "k_wide must give headroom above the result cap");
        Self {
            index,
            triples,
            k_wide,
            cap,
        }
    }

    async fn retrieve_inner(&self, query: &QueryRecord) -> Result<RetrievalResult> {
        let start = Instant::now();

        let candidates = self.index.search(&query.text, self.k_wide).await?;
        tracing::debug!(query = %query.id, candidates = candidates.len(), "wide search done");

        let mut survivors: Vec<ScoredItem> = candidates
            .into_iter()
            .filter(|hit| self.passes_constraints(&hit.id, query))
            .collect();

        survivors.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        survivors.truncate(self.cap);

        Ok(RetrievalResult {
            path: RetrievalPath::Hybrid,
            item_ids: survivors.into_iter().map(|h| h.id).collect(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Every required attribute must hold; an item with no triples for a
    /// constrained attribute fails that constraint.
    fn passes_constraints(&self, item_id: &str, query: &QueryRecord) -> bool {
        query
            .required_attributes
            .iter()
            .all(|(name, wanted)| self.satisfies(item_id, name, wanted))
    }

    fn satisfies(&self, item_id: &str, name: &str, wanted: &AttrValue) -> bool {
        if let Some(attr) = name.strip_prefix("max_") {
            return match wanted.as_num() {
                Some(bound) => self.numeric_attr(item_id, attr).map_or(false, |v| v <= bound),
                None => false,
            };
        }
        if let Some(attr) = name.strip_prefix("min_") {
            return match wanted.as_num() {
                Some(bound) => self.numeric_attr(item_id, attr).map_or(false, |v| v >= bound),
                None => false,
            };
        }

        match name {
            "type" | "family" => match wanted.as_str() {
                Some(s) => self
                    .triples
                    .family_of(item_id)
                    .map_or(false, |f| f.eq_ignore_ascii_case(s)),
                None => false,
            },
            "category" => match wanted.as_str() {
                Some(s) => self
                    .triples
                    .categories_of(item_id)
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(s)),
                None => false,
            },
            _ => self
                .triples
                .attribute_of(item_id, name)
                .iter()
                .any(|actual| values_match(actual, wanted)),
        }
    }

    fn numeric_attr(&self, item_id: &str, name: &str) -> Option<f64> {
        self.triples
            .attribute_of(item_id, name)
            .iter()
            .find_map(|v| v.as_num())
    }
}

/// Typed comparison: booleans and numbers must match exactly in kind and
/// value, strings compare case-insensitively, and any kind mismatch is a
/// failed match rather than a coercion.
fn values_match(actual: &AttrValue, wanted: &AttrValue) -> bool {
    match (actual, wanted) {
        (AttrValue::Bool(a), AttrValue::Bool(w)) => a == w,
        (AttrValue::Num(a), AttrValue::Num(w)) => a == w,
        (AttrValue::Str(a), AttrValue::Str(w)) => a.eq_ignore_ascii_case(w),
        _ => false,
    }
}

#[async_trait::async_trait]
impl Retriever for HybridRetriever {
    fn path(&self) -> RetrievalPath {
        RetrievalPath::Hybrid
    }

    async fn retrieve(&self, query: &QueryRecord) -> Result<RetrievalResult> {
        self.retrieve_inner(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_match_refuses_type_coercion() {
        assert!(!values_match(
            &AttrValue::Str("true".into()),
            &AttrValue::Bool(true)
        ));
        assert!(!values_match(
            &AttrValue::Num(1.0),
            &AttrValue::Str("1".into())
        ));
        assert!(values_match(
            &AttrValue::Str("Trail".into()),
            &AttrValue::Str("trail".into())
        ));
    }
}
