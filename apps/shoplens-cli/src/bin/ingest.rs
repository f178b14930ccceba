use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shoplens_core::catalog::CatalogStore;
use shoplens_core::config::{expand_path, Config};
use shoplens_embed::default_embedder;
use shoplens_symbolic::TripleStore;
use shoplens_vector::EmbeddingIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let settings = config.settings()?;

    let catalog_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| expand_path(&settings.catalog_path));

    println!("Ingesting catalog from {}", catalog_path.display());
    let catalog = Arc::new(CatalogStore::load(&catalog_path)?);
    println!("Loaded {} items", catalog.len());

    let triples = TripleStore::ingest(&catalog);
    println!("Derived {} fact triples", triples.len());

    let embedder = default_embedder()?;
    let index = EmbeddingIndex::open(&expand_path(&settings.index_dir), "items", embedder).await?;
    index.build(&catalog).await?;
    println!("✅ Embedding index built ({} items)", catalog.len());

    Ok(())
}
