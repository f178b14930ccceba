//! Keyword retrieval baseline.
//!
//! Intentionally naive: term-overlap scoring over raw listing text supplied
//! by the storefront collaborator. This is the system the hybrid retriever
//! is benchmarked against, not one to optimize. The listing source is a
//! single logical browser session upstream, so callers serialize access to
//! one `Storefront` across concurrent queries.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use shoplens_core::catalog::CatalogStore;
use shoplens_core::error::{Error, Result};
use shoplens_core::traits::Retriever;
use shoplens_core::types::{QueryRecord, RetrievalPath, RetrievalResult};

pub const RESULT_CAP: usize = 10;

/// One scraped product listing as the storefront collaborator delivers it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    #[serde(default)]
    pub price_text: String,
    #[serde(default)]
    pub full_text: String,
}

/// The scraping collaborator seam. Implementations fetch the complete list
/// of currently listed items; candidate generation only, never fact-checking.
pub trait Storefront: Send + Sync {
    fn fetch_listings(&self) -> Result<Vec<Listing>>;
}

/// File-backed storefront: a JSON array of listings captured offline.
pub struct JsonStorefront {
    path: std::path::PathBuf,
}

impl JsonStorefront {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storefront for JsonStorefront {
    fn fetch_listings(&self) -> Result<Vec<Listing>> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Scrape(format!("cannot read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Scrape(format!("malformed listings file: {}", e)))
    }
}

/// In-memory storefront for tests and single-query runs.
pub struct StaticStorefront {
    listings: Vec<Listing>,
}

impl StaticStorefront {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }
}

impl Storefront for StaticStorefront {
    fn fetch_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.listings.clone())
    }
}

/// Score listings against a query: lowercase whitespace tokens, one point
/// per token present as a substring of the listing text. Zero-score
/// listings are dropped, ties keep scrape order (stable sort), output is
/// capped at `RESULT_CAP`.
pub fn rank_listings<'a>(listings: &'a [Listing], query: &str) -> Vec<&'a Listing> {
    let query_lower = query.to_lowercase();
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &Listing)> = Vec::new();
    for listing in listings {
        let text = format!("{} {}", listing.name, listing.full_text).to_lowercase();
        let score = tokens.iter().filter(|t| text.contains(*t)).count();
        if score > 0 {
            scored.push((score, listing));
        }
    }
    // Stable sort: equal scores stay in scrape order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(RESULT_CAP);
    scored.into_iter().map(|(_, l)| l).collect()
}

pub struct KeywordRetriever {
    storefront: Box<dyn Storefront>,
    catalog: Arc<CatalogStore>,
}

impl KeywordRetriever {
    pub fn new(storefront: Box<dyn Storefront>, catalog: Arc<CatalogStore>) -> Self {
        Self { storefront, catalog }
    }

    fn retrieve_sync(&self, query_text: &str) -> Result<RetrievalResult> {
        let start = Instant::now();
        let listings = self.storefront.fetch_listings()?;
        let ranked = rank_listings(&listings, query_text);

        // Resolve listing names to catalog ids. An unresolved name is kept
        // verbatim so the existence check downstream flags it; dropping it
        // here would hide a scraper/catalog mismatch.
        let item_ids = ranked
            .iter()
            .map(|listing| match self.catalog.find_by_name(&listing.name) {
                Some(item) => item.id.clone(),
                None => {
                    tracing::warn!(name = %listing.name, "listing not found in catalog");
                    listing.name.clone()
                }
            })
            .collect();

        Ok(RetrievalResult {
            path: RetrievalPath::Keyword,
            item_ids,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait::async_trait]
impl Retriever for KeywordRetriever {
    fn path(&self) -> RetrievalPath {
        RetrievalPath::Keyword
    }

    async fn retrieve(&self, query: &QueryRecord) -> Result<RetrievalResult> {
        self.retrieve_sync(&query.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, full_text: &str) -> Listing {
        Listing {
            name: name.to_string(),
            price_text: "$140".to_string(),
            full_text: full_text.to_string(),
        }
    }

    #[test]
    fn zero_match_listings_are_excluded() {
        let listings = vec![
            listing("Ridge Runner", "waterproof trail shoe"),
            listing("City Pacer", "road racing flat"),
        ];
        let ranked = rank_listings(&listings, "trail shoes");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Ridge Runner");
    }

    #[test]
    fn ties_keep_scrape_order() {
        let listings = vec![
            listing("A", "trail"),
            listing("B", "trail"),
            listing("C", "trail running"),
        ];
        let ranked = rank_listings(&listings, "trail running");
        let names: Vec<&str> = ranked.iter().map(|l| l.name.as_str()).collect();
        // C scores 2; A and B tie at 1 and keep their scrape order.
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn output_is_capped_at_ten() {
        let listings: Vec<Listing> = (0..25)
            .map(|i| listing(&format!("Shoe {}", i), "trail"))
            .collect();
        let ranked = rank_listings(&listings, "trail");
        assert_eq!(ranked.len(), RESULT_CAP);
    }

    #[test]
    fn substring_matching_is_case_insensitive() {
        let listings = vec![listing("RIDGE RUNNER GTX", "WATERPROOF TRAIL")];
        let ranked = rank_listings(&listings, "waterproof ridge");
        assert_eq!(ranked.len(), 1);
    }
}
