//! Catalog store: canonical item records and the textual projection used
//! for embedding.
//!
//! The store is loaded once, immutable afterwards, and is the single source
//! of truth for fact-checking. Loading accepts either one JSON file (a
//! single item or an array) or a directory of `*.json` item files.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{AttrValue, Item, ItemId};

#[derive(Debug, Default)]
pub struct CatalogStore {
    items: BTreeMap<ItemId, Item>,
}

impl CatalogStore {
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for item in items {
            if item.id.is_empty() {
                anyhow::bail!("catalog item with empty id");
            }
            if map.insert(item.id.clone(), item).is_some() {
                anyhow::bail!("duplicate catalog item id");
            }
        }
        Ok(Self { items: map })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let files = if path.is_dir() {
            list_json_files(path)
        } else {
            vec![path.to_path_buf()]
        };
        if files.is_empty() {
            anyhow::bail!("no catalog files under {}", path.display());
        }

        let mut items = Vec::new();
        for file in &files {
            let raw = fs::read_to_string(file)?;
            // A file holds either one item object or an array of items.
            match serde_json::from_str::<Vec<Item>>(&raw) {
                Ok(batch) => items.extend(batch),
                Err(_) => items.push(serde_json::from_str::<Item>(&raw).map_err(|e| {
                    anyhow::anyhow!("invalid catalog record in {}: {}", file.display(), e)
                })?),
            }
        }
        tracing::info!(files = files.len(), items = items.len(), "catalog loaded");
        Self::from_items(items)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Case-insensitive exact lookup by display name ("<brand> <name>" or
    /// the bare name). Used to resolve scraped listings to catalog ids.
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        let wanted = name.trim().to_lowercase();
        self.items.values().find(|item| {
            let full = format!("{} {}", item.brand, item.name).to_lowercase();
            full == wanted || item.name.to_lowercase() == wanted
        })
    }

    /// Items in id order, which keeps every derived structure deterministic.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Normalized textual projection of an item, the input to the embedding
    /// function. Deterministic: attribute enumeration follows the item's
    /// sorted attribute map.
    pub fn description_of(item: &Item) -> String {
        let mut out = format!("{} {} is a {} item.", item.brand, item.name, item.family);

        let categories = item.categories();
        if !categories.is_empty() {
            out.push_str(&format!(
                " It belongs to categories: {}.",
                categories.join(", ")
            ));
        }

        let mut attrs: Vec<String> = Vec::new();
        for (name, value) in &item.attributes {
            if name == "categories" {
                continue;
            }
            match value {
                AttrValue::List(entries) => {
                    for entry in entries {
                        attrs.push(format!("{} is {}", name, entry));
                    }
                }
                other => attrs.push(format!("{} is {}", name, other)),
            }
        }
        if !attrs.is_empty() {
            out.push_str(&format!(" Attributes: {}.", attrs.join(", ")));
        }

        out.push_str(&format!(" Priced at {}.", item.price));
        out.push_str(if item.in_stock {
            " Currently in stock."
        } else {
            " Currently out of stock."
        });
        out
    }
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttrValue;
    use std::collections::BTreeSet;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            brand: "Peak".to_string(),
            name: "Ridge Runner".to_string(),
            family: "trail".to_string(),
            price: 149.99,
            in_stock: true,
            available_sizes: BTreeSet::from(["9".to_string(), "10".to_string()]),
            attributes: BTreeMap::from([
                ("waterproof".to_string(), AttrValue::Bool(true)),
                (
                    "categories".to_string(),
                    AttrValue::List(vec![
                        AttrValue::Str("Trail".into()),
                        AttrValue::Str("Outdoor".into()),
                    ]),
                ),
            ]),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = CatalogStore::from_items(vec![item("a"), item("a")]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn description_covers_fields_and_flattens_attributes() {
        let desc = CatalogStore::description_of(&item("a"));
        assert!(desc.starts_with("Peak Ridge Runner is a trail item."));
        assert!(desc.contains("categories: Trail, Outdoor"));
        assert!(desc.contains("waterproof is true"));
        assert!(desc.contains("Priced at 149.99"));
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let store = CatalogStore::from_items(vec![item("a")]).unwrap();
        assert!(store.find_by_name("peak ridge runner").is_some());
        assert!(store.find_by_name("Ridge Runner").is_some());
        assert!(store.find_by_name("Ridge").is_none());
    }
}
