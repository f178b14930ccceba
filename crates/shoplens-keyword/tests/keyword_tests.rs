use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use shoplens_core::catalog::CatalogStore;
use shoplens_core::error::Error;
use shoplens_core::traits::Retriever;
use shoplens_core::types::{Item, QueryRecord, RetrievalPath};
use shoplens_keyword::{JsonStorefront, KeywordRetriever, Listing, StaticStorefront, Storefront};

fn shoe(id: &str, brand: &str, name: &str) -> Item {
    Item {
        id: id.to_string(),
        brand: brand.to_string(),
        name: name.to_string(),
        family: "trail".to_string(),
        price: 140.0,
        in_stock: true,
        available_sizes: BTreeSet::new(),
        attributes: BTreeMap::new(),
    }
}

fn query(text: &str) -> QueryRecord {
    serde_json::from_str(&format!(r#"{{"id": "Q1", "text": "{}"}}"#, text)).unwrap()
}

fn listing(name: &str, full_text: &str) -> Listing {
    Listing {
        name: name.to_string(),
        price_text: String::new(),
        full_text: full_text.to_string(),
    }
}

#[tokio::test]
async fn listings_resolve_to_catalog_ids_by_name() {
    let catalog = Arc::new(
        CatalogStore::from_items(vec![shoe("sku-1", "Peak", "Ridge Runner")]).unwrap(),
    );
    let storefront = StaticStorefront::new(vec![listing("Peak Ridge Runner", "trail shoe")]);
    let retriever = KeywordRetriever::new(Box::new(storefront), catalog);

    let result = retriever.retrieve(&query("trail shoe")).await.unwrap();
    assert_eq!(result.path, RetrievalPath::Keyword);
    assert_eq!(result.item_ids, vec!["sku-1".to_string()]);
}

#[tokio::test]
async fn unresolved_listing_keeps_its_name_as_id() {
    let catalog = Arc::new(
        CatalogStore::from_items(vec![shoe("sku-1", "Peak", "Ridge Runner")]).unwrap(),
    );
    let storefront = StaticStorefront::new(vec![listing("Phantom Flyer", "trail shoe")]);
    let retriever = KeywordRetriever::new(Box::new(storefront), catalog);

    let result = retriever.retrieve(&query("trail shoe")).await.unwrap();
    // Not silently dropped: the unknown name flows through for the
    // existence check to flag.
    assert_eq!(result.item_ids, vec!["Phantom Flyer".to_string()]);
}

#[test]
fn missing_listings_file_is_a_scrape_failure() {
    let storefront = JsonStorefront::new("/definitely/not/here.json");
    let err = storefront.fetch_listings().unwrap_err();
    assert!(matches!(err, Error::Scrape(_)));
}

#[test]
fn json_storefront_round_trip() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        tmp.path(),
        r#"[{"name": "Peak Ridge Runner", "price_text": "$140", "full_text": "waterproof trail"}]"#,
    )
    .unwrap();
    let storefront = JsonStorefront::new(tmp.path());
    let listings = storefront.fetch_listings().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "Peak Ridge Runner");
}
