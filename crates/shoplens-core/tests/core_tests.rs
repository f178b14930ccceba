use std::fs;
use tempfile::TempDir;

use shoplens_core::catalog::CatalogStore;

fn item_json(id: &str, name: &str) -> String {
    format!(
        r#"{{"id": "{id}", "brand": "Peak", "name": "{name}", "family": "trail",
            "price": 120.0, "in_stock": true,
            "available_sizes": ["9", "10"],
            "attributes": {{"waterproof": true}}}}"#
    )
}

#[test]
fn load_directory_of_item_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.json"), item_json("sku-a", "Ridge Runner")).unwrap();
    fs::write(dir.join("b.json"), item_json("sku-b", "Summit Pro")).unwrap();
    fs::write(dir.join("notes.txt"), "not a catalog file").unwrap();

    let store = CatalogStore::load(dir).expect("load");

    assert_eq!(store.len(), 2);
    assert!(store.contains("sku-a"));
    assert!(store.contains("sku-b"));
}

#[test]
fn load_single_file_with_array() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.json");
    fs::write(
        &path,
        format!(
            "[{}, {}]",
            item_json("sku-a", "Ridge Runner"),
            item_json("sku-b", "Summit Pro")
        ),
    )
    .unwrap();

    let store = CatalogStore::load(&path).expect("load");
    assert_eq!(store.len(), 2);
}

#[test]
fn iteration_order_is_id_sorted() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("z.json"), item_json("sku-z", "Zephyr")).unwrap();
    fs::write(dir.join("a.json"), item_json("sku-a", "Ridge Runner")).unwrap();

    let store = CatalogStore::load(dir).expect("load");
    let ids: Vec<&str> = store.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["sku-a", "sku-z"]);
}
