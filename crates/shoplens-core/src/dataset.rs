//! Ground-truth query dataset loading and validation.
//!
//! A malformed record is a data contract violation: the loader returns
//! `Error::Validation` and the whole run aborts, unlike per-query failures
//! which only mark the one query as failed.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{QueryCategory, QueryRecord};

#[derive(Debug, Deserialize)]
struct QueryFile {
    #[serde(default)]
    metadata: serde_json::Value,
    queries: Vec<QueryRecord>,
}

#[derive(Debug)]
pub struct QueryDataset {
    pub metadata: serde_json::Value,
    pub queries: Vec<QueryRecord>,
}

impl QueryDataset {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Validation(format!("cannot read {}: {}", path.display(), e)))?;

        // Accept either the {metadata, queries} wrapper or a bare array.
        let (metadata, queries) = match serde_json::from_str::<QueryFile>(&raw) {
            Ok(file) => (file.metadata, file.queries),
            Err(_) => {
                let queries: Vec<QueryRecord> = serde_json::from_str(&raw)
                    .map_err(|e| Error::Validation(format!("malformed query record: {}", e)))?;
                (serde_json::Value::Null, queries)
            }
        };

        let dataset = Self { metadata, queries };
        dataset.validate()?;
        tracing::info!(queries = dataset.queries.len(), "query dataset loaded");
        Ok(dataset)
    }

    fn validate(&self) -> Result<()> {
        if self.queries.is_empty() {
            return Err(Error::Validation("dataset contains no queries".into()));
        }
        let mut seen = HashSet::new();
        for q in &self.queries {
            if q.id.trim().is_empty() {
                return Err(Error::Validation("query with empty id".into()));
            }
            if !seen.insert(q.id.as_str()) {
                return Err(Error::Validation(format!("duplicate query id {}", q.id)));
            }
            if q.text.trim().is_empty() {
                return Err(Error::Validation(format!("query {} has empty text", q.id)));
            }
            if q.min_expected_results > q.max_acceptable_results {
                return Err(Error::Validation(format!(
                    "query {}: min_expected_results {} exceeds max_acceptable_results {}",
                    q.id, q.min_expected_results, q.max_acceptable_results
                )));
            }
            for (name, value) in &q.required_attributes {
                let is_range = name.starts_with("max_") || name.starts_with("min_");
                if is_range && value.as_num().is_none() {
                    return Err(Error::Validation(format!(
                        "query {}: range constraint {} must be numeric",
                        q.id, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn in_category(&self, category: QueryCategory) -> Vec<&QueryRecord> {
        self.queries
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }
}
