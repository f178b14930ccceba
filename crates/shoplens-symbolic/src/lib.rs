//! Symbolic attribute store: exact-match fact triples derived from the
//! catalog.
//!
//! Triples take the form `(item_id, predicate, value)` with predicates
//! `is_a`, `has_category` and `has_attribute(<name>)`. Queries are ground
//! or single-variable, so two indexed multi-maps cover every lookup shape:
//! by item (enrichment) and by `(predicate, value)` (reverse lookup). No
//! unification engine.

use std::collections::{BTreeSet, HashMap};

use shoplens_core::catalog::CatalogStore;
use shoplens_core::types::{AttrValue, Item, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IsA,
    HasCategory,
    HasAttribute(String),
}

impl Predicate {
    fn key(&self) -> String {
        match self {
            Predicate::IsA => "is_a".to_string(),
            Predicate::HasCategory => "has_category".to_string(),
            Predicate::HasAttribute(name) => format!("has_attribute:{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    pub item_id: ItemId,
    pub predicate: Predicate,
    pub value: AttrValue,
}

/// Canonical string form of a value, used as the exact-match index key.
fn value_key(value: &AttrValue) -> String {
    match value {
        AttrValue::Bool(b) => format!("b:{}", b),
        AttrValue::Num(n) => format!("n:{}", n),
        AttrValue::Str(s) => format!("s:{}", s),
        AttrValue::List(_) => "list".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct TripleStore {
    by_item: HashMap<ItemId, Vec<Triple>>,
    by_pattern: HashMap<(String, String), BTreeSet<ItemId>>,
    triple_count: usize,
}

impl TripleStore {
    /// Derive every triple from the catalog. 1:1 with item state at
    /// ingestion time; a changed catalog requires re-ingestion.
    pub fn ingest(catalog: &CatalogStore) -> Self {
        let mut store = Self::default();
        for item in catalog.iter() {
            store.add_item(item);
        }
        tracing::debug!(
            items = store.by_item.len(),
            triples = store.triple_count,
            "triple store built"
        );
        store
    }

    fn add_item(&mut self, item: &Item) {
        self.add(item, Predicate::IsA, AttrValue::Str(item.family.clone()));
        for category in item.categories() {
            self.add(item, Predicate::HasCategory, AttrValue::Str(category));
        }
        self.add(
            item,
            Predicate::HasAttribute("brand".into()),
            AttrValue::Str(item.brand.clone()),
        );
        self.add(
            item,
            Predicate::HasAttribute("price".into()),
            AttrValue::Num(item.price),
        );
        self.add(
            item,
            Predicate::HasAttribute("in_stock".into()),
            AttrValue::Bool(item.in_stock),
        );
        for size in &item.available_sizes {
            self.add(
                item,
                Predicate::HasAttribute("available_sizes".into()),
                AttrValue::Str(size.clone()),
            );
        }
        for (name, value) in &item.attributes {
            if name == "categories" {
                continue;
            }
            match value {
                // Multi-valued attributes fan out into one triple each.
                AttrValue::List(entries) => {
                    for entry in entries {
                        self.add(item, Predicate::HasAttribute(name.clone()), entry.clone());
                    }
                }
                other => self.add(item, Predicate::HasAttribute(name.clone()), other.clone()),
            }
        }
    }

    fn add(&mut self, item: &Item, predicate: Predicate, value: AttrValue) {
        self.by_pattern
            .entry((predicate.key(), value_key(&value)))
            .or_default()
            .insert(item.id.clone());
        self.by_item.entry(item.id.clone()).or_default().push(Triple {
            item_id: item.id.clone(),
            predicate,
            value,
        });
        self.triple_count += 1;
    }

    /// Every triple for an item. An id with zero triples yields an empty
    /// slice; it is the caller's job to only pass ids that exist in the
    /// catalog.
    pub fn enrich(&self, item_id: &str) -> &[Triple] {
        self.by_item.get(item_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exact-match reverse lookup: all item ids holding this exact triple.
    pub fn query(&self, predicate: &Predicate, value: &AttrValue) -> BTreeSet<ItemId> {
        self.by_pattern
            .get(&(predicate.key(), value_key(value)))
            .cloned()
            .unwrap_or_default()
    }

    pub fn family_of(&self, item_id: &str) -> Option<&str> {
        self.enrich(item_id).iter().find_map(|t| match t.predicate {
            Predicate::IsA => t.value.as_str(),
            _ => None,
        })
    }

    pub fn categories_of(&self, item_id: &str) -> BTreeSet<String> {
        self.enrich(item_id)
            .iter()
            .filter(|t| t.predicate == Predicate::HasCategory)
            .map(|t| t.value.to_string())
            .collect()
    }

    /// All values of a named attribute for an item (multi-valued attributes
    /// return more than one).
    pub fn attribute_of(&self, item_id: &str, name: &str) -> Vec<&AttrValue> {
        self.enrich(item_id)
            .iter()
            .filter(|t| matches!(&t.predicate, Predicate::HasAttribute(n) if n == name))
            .map(|t| &t.value)
            .collect()
    }

    pub fn items_in_category(&self, category: &str) -> BTreeSet<ItemId> {
        self.query(
            &Predicate::HasCategory,
            &AttrValue::Str(category.to_string()),
        )
    }

    pub fn items_with_attribute(&self, name: &str, value: &AttrValue) -> BTreeSet<ItemId> {
        self.query(&Predicate::HasAttribute(name.to_string()), value)
    }

    pub fn len(&self) -> usize {
        self.triple_count
    }

    pub fn is_empty(&self) -> bool {
        self.triple_count == 0
    }
}
