//! Embedding index: one vector per catalog item, nearest-neighbor search
//! over LanceDB.
//!
//! The index is derived data. `build` always recreates the table from the
//! catalog; there is no incremental-update path, so a changed item means a
//! rebuild. `search` distinguishes a legitimate empty result (`Ok(vec![])`)
//! from an unreachable or unbuilt index (`Error::Retrieval`).

use anyhow::Result;
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};

use shoplens_core::catalog::CatalogStore;
use shoplens_core::error::{Error, Result as CoreResult};
use shoplens_core::types::ItemId;
use shoplens_embed::Embedder;

pub mod schema;
pub mod table;

/// One nearest-neighbor hit. `score` is a similarity (higher is better).
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub id: ItemId,
    pub score: f32,
}

pub struct EmbeddingIndex {
    db: Connection,
    table_name: String,
    embedder: Box<dyn Embedder>,
}

impl EmbeddingIndex {
    pub async fn open(db_path: &Path, table_name: &str, embedder: Box<dyn Embedder>) -> Result<Self> {
        let db = table::open_db(db_path.to_string_lossy().as_ref()).await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            embedder,
        })
    }

    /// Embed every item's textual projection and (re)create the index table.
    pub async fn build(&self, catalog: &CatalogStore) -> Result<()> {
        if catalog.is_empty() {
            anyhow::bail!("cannot index an empty catalog");
        }
        if table::table_exists(&self.db, &self.table_name).await? {
            self.db.drop_table(&self.table_name, &[]).await?;
        }

        let items: Vec<(&ItemId, String)> = catalog
            .iter()
            .map(|item| (&item.id, CatalogStore::description_of(item)))
            .collect();

        tracing::info!(items = items.len(), table = %self.table_name, "building embedding index");
        let pb = ProgressBar::new(items.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} items {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut ids: Vec<String> = Vec::with_capacity(items.len());
        let mut descriptions: Vec<String> = Vec::with_capacity(items.len());
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(items.len());
        for batch in items.chunks(64) {
            let texts: Vec<String> = batch.iter().map(|(_, d)| d.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts)?;
            for ((id, description), embedding) in batch.iter().zip(embeddings) {
                if embedding.len() != self.embedder.dim() {
                    anyhow::bail!("embedding dim mismatch for item {}", id);
                }
                ids.push((*id).clone());
                descriptions.push(description.clone());
                vectors.push(Some(embedding.into_iter().map(Some).collect()));
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        let schema = schema::build_arrow_schema(self.embedder.dim() as i32);
        let record_batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(descriptions)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), self.embedder.dim() as i32)),
            ],
        )?;
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(record_batch)].into_iter(),
            schema,
        ));
        self.db
            .create_table(&self.table_name, reader)
            .execute()
            .await?;
        tracing::info!(table = %self.table_name, "embedding index built");
        Ok(())
    }

    /// Embed the query with the same embedding function and return the `k`
    /// most similar item ids, ties broken by id ascending.
    pub async fn search(&self, query_text: &str, k: usize) -> CoreResult<Vec<ScoredItem>> {
        let query_vec = self
            .embedder
            .embed_batch(&[query_text.to_string()])
            .map_err(|e| Error::Retrieval(format!("query embedding failed: {}", e)))?
            .remove(0);

        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| Error::Retrieval(format!("index unavailable: {}", e)))?;

        // Over-fetch so the deterministic re-sort below sees every candidate
        // that could make the top k after tie-breaking.
        let fetch_limit = k.saturating_mul(10).max(k);
        let mut stream = table
            .vector_search(query_vec)
            .map_err(|e| Error::Retrieval(format!("vector search failed: {}", e)))?
            .limit(fetch_limit)
            .execute()
            .await
            .map_err(|e| Error::Retrieval(format!("vector search failed: {}", e)))?;

        let mut hits: Vec<ScoredItem> = Vec::new();
        while let Some(batch) = TryStreamExt::try_next(&mut stream)
            .await
            .map_err(|e| Error::Retrieval(format!("vector search stream failed: {}", e)))?
        {
            for i in 0..batch.num_rows() {
                let id = string_column(&batch, "id", i)?;
                let score = match float_column(&batch, "_distance", i) {
                    Some(distance) => 1.0 - distance,
                    None => float_column(&batch, "_score", i).unwrap_or(0.5),
                };
                hits.push(ScoredItem { id, score });
            }
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

fn string_column(batch: &RecordBatch, name: &str, row: usize) -> CoreResult<String> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::Retrieval(format!("missing column {}", name)))?;
    Ok(col.value(row).to_string())
}

fn float_column(batch: &RecordBatch, name: &str, row: usize) -> Option<f32> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<arrow_array::Float32Array>())
        .map(|c| c.value(row))
}
