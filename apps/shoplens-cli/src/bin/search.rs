use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shoplens_core::catalog::CatalogStore;
use shoplens_core::config::{expand_path, Config};
use shoplens_core::traits::Retriever;
use shoplens_core::types::QueryRecord;
use shoplens_embed::default_embedder;
use shoplens_hybrid::HybridRetriever;
use shoplens_symbolic::TripleStore;
use shoplens_vector::EmbeddingIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let query_text = match env::args().nth(1) {
        Some(q) => q,
        None => {
            eprintln!("Usage: shoplens-search \"<query>\"");
            std::process::exit(1);
        }
    };

    let config = Config::load()?;
    let settings = config.settings()?;

    let catalog = Arc::new(CatalogStore::load(&expand_path(&settings.catalog_path))?);
    let triples = Arc::new(TripleStore::ingest(&catalog));
    let embedder = default_embedder()?;
    let index = EmbeddingIndex::open(&expand_path(&settings.index_dir), "items", embedder).await?;
    let retriever = HybridRetriever::new(index, triples, settings.k_wide, settings.result_cap);

    let query: QueryRecord =
        serde_json::from_value(serde_json::json!({"id": "adhoc", "text": query_text}))?;
    let result = retriever.retrieve(&query).await?;

    if result.item_ids.is_empty() {
        println!("No matching items ({} ms)", result.latency_ms);
        return Ok(());
    }
    println!("{} results in {} ms:", result.item_ids.len(), result.latency_ms);
    for (rank, id) in result.item_ids.iter().enumerate() {
        match catalog.get(id) {
            Some(item) => println!(
                "{:>2}. {} {} [{}] (${:.2})",
                rank + 1,
                item.brand,
                item.name,
                item.family,
                item.price
            ),
            None => println!("{:>2}. {} (not in catalog)", rank + 1, id),
        }
    }
    Ok(())
}
