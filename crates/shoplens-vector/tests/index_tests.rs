use std::collections::{BTreeMap, BTreeSet};

use shoplens_core::catalog::CatalogStore;
use shoplens_core::error::Error;
use shoplens_core::types::{AttrValue, Item};
use shoplens_embed::HashEmbedder;
use shoplens_vector::EmbeddingIndex;

fn shoe(id: &str, name: &str, family: &str) -> Item {
    Item {
        id: id.to_string(),
        brand: "Peak".to_string(),
        name: name.to_string(),
        family: family.to_string(),
        price: 140.0,
        in_stock: true,
        available_sizes: BTreeSet::from(["9".to_string()]),
        attributes: BTreeMap::from([("waterproof".to_string(), AttrValue::Bool(true))]),
    }
}

fn catalog() -> CatalogStore {
    CatalogStore::from_items(vec![
        shoe("sku-1", "Ridge Runner", "trail"),
        shoe("sku-2", "City Pacer", "road"),
        shoe("sku-3", "Summit Pro", "trail"),
    ])
    .unwrap()
}

#[tokio::test]
async fn build_then_search_returns_catalog_ids() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let catalog = catalog();
    let index =
        EmbeddingIndex::open(tmp.path(), "items", Box::new(HashEmbedder::default())).await?;
    index.build(&catalog).await?;

    let hits = index.search("trail shoes", 3).await?;
    assert!(!hits.is_empty());
    for hit in &hits {
        assert!(catalog.contains(&hit.id), "hit {} must exist in catalog", hit.id);
    }
    Ok(())
}

#[tokio::test]
async fn search_is_deterministic() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index =
        EmbeddingIndex::open(tmp.path(), "items", Box::new(HashEmbedder::default())).await?;
    index.build(&catalog()).await?;

    let first: Vec<String> = index
        .search("waterproof trail shoes", 3)
        .await?
        .into_iter()
        .map(|h| h.id)
        .collect();
    let second: Vec<String> = index
        .search("waterproof trail shoes", 3)
        .await?
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn unbuilt_index_is_a_retrieval_failure_not_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index =
        EmbeddingIndex::open(tmp.path(), "items", Box::new(HashEmbedder::default())).await?;

    let err = index.search("anything", 3).await.unwrap_err();
    assert!(matches!(err, Error::Retrieval(_)));
    Ok(())
}

#[tokio::test]
async fn rebuild_replaces_the_table() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index =
        EmbeddingIndex::open(tmp.path(), "items", Box::new(HashEmbedder::default())).await?;
    index.build(&catalog()).await?;

    let smaller = CatalogStore::from_items(vec![shoe("sku-9", "Dune Drifter", "trail")]).unwrap();
    index.build(&smaller).await?;

    let hits = index.search("trail shoes", 10).await?;
    assert!(hits.iter().all(|h| h.id == "sku-9"));
    Ok(())
}
