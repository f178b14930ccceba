use std::collections::{BTreeMap, BTreeSet};

use shoplens_core::catalog::CatalogStore;
use shoplens_core::types::{AttrValue, Item};
use shoplens_symbolic::{Predicate, TripleStore};

fn shoe(id: &str, family: &str, categories: &[&str], waterproof: bool) -> Item {
    Item {
        id: id.to_string(),
        brand: "Peak".to_string(),
        name: format!("Model {}", id),
        family: family.to_string(),
        price: 150.0,
        in_stock: true,
        available_sizes: BTreeSet::from(["9".to_string()]),
        attributes: BTreeMap::from([
            ("waterproof".to_string(), AttrValue::Bool(waterproof)),
            (
                "categories".to_string(),
                AttrValue::List(categories.iter().map(|c| AttrValue::Str(c.to_string())).collect()),
            ),
        ]),
    }
}

fn store() -> TripleStore {
    let catalog = CatalogStore::from_items(vec![
        shoe("sku-1", "trail", &["Trail", "Outdoor", "Running"], true),
        shoe("sku-2", "road", &["Road"], false),
        shoe("sku-3", "trail", &["Trail"], false),
    ])
    .unwrap();
    TripleStore::ingest(&catalog)
}

#[test]
fn multi_valued_category_fans_out_into_one_triple_each() {
    let store = store();
    let cats = store.categories_of("sku-1");
    assert_eq!(
        cats,
        BTreeSet::from(["Trail".to_string(), "Outdoor".to_string(), "Running".to_string()])
    );
}

#[test]
fn reverse_lookup_is_exact_match() {
    let store = store();
    let trail: Vec<String> = store.items_in_category("Trail").into_iter().collect();
    assert_eq!(trail, vec!["sku-1".to_string(), "sku-3".to_string()]);

    // No fuzzy matching: a different case is a different value.
    assert!(store.items_in_category("trail").is_empty());
}

#[test]
fn attribute_lookup_by_value() {
    let store = store();
    let waterproof = store.items_with_attribute("waterproof", &AttrValue::Bool(true));
    assert_eq!(waterproof.into_iter().collect::<Vec<_>>(), vec!["sku-1".to_string()]);
}

#[test]
fn family_comes_from_is_a() {
    let store = store();
    assert_eq!(store.family_of("sku-2"), Some("road"));
    let trail_items = store.query(&Predicate::IsA, &AttrValue::Str("trail".into()));
    assert_eq!(trail_items.len(), 2);
}

#[test]
fn enrich_unknown_id_is_empty_not_error() {
    let store = store();
    assert!(store.enrich("sku-missing").is_empty());
}

#[test]
fn typed_fields_become_attribute_triples() {
    let store = store();
    let prices = store.attribute_of("sku-1", "price");
    assert_eq!(prices, vec![&AttrValue::Num(150.0)]);
    let stock = store.attribute_of("sku-1", "in_stock");
    assert_eq!(stock, vec![&AttrValue::Bool(true)]);
}
