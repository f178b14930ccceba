//! Deterministic hallucination detection: factual claims from a synthesized
//! answer checked against the catalog store. No LLM involved.
//!
//! Rules run in a fixed order per claimed item: existence, boolean
//! attributes, price tolerance, availability, sizes. A non-existent item
//! short-circuits the remaining rules for that claim since there is no
//! catalog record to compare against.

use std::collections::BTreeMap;

use shoplens_core::catalog::CatalogStore;
use shoplens_core::types::{
    AttrValue, HallucinationKind, HallucinationRecord, ItemId, Severity,
};

/// Relative price difference above which a claimed price is flagged.
/// Exactly at the tolerance is still acceptable.
pub const PRICE_TOLERANCE: f64 = 0.05;

/// Structured factual claims about one item, extracted from an answer.
/// Fields left `None`/empty make no assertion and are not checked.
#[derive(Debug, Clone, Default)]
pub struct ItemClaim {
    pub item_id: ItemId,
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
    pub sizes: Vec<String>,
    pub attributes: BTreeMap<String, bool>,
}

impl ItemClaim {
    pub fn existence_only(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            ..Self::default()
        }
    }
}

pub fn check_claims(catalog: &CatalogStore, claims: &[ItemClaim]) -> Vec<HallucinationRecord> {
    let mut records = Vec::new();
    for claim in claims {
        let item = match catalog.get(&claim.item_id) {
            Some(item) => item,
            None => {
                records.push(HallucinationRecord {
                    kind: HallucinationKind::NonExistentProduct,
                    claim: format!("answer references item {}", claim.item_id),
                    actual: "no such item in catalog".to_string(),
                    severity: Severity::Critical,
                });
                // No catalog record to compare the remaining rules against.
                continue;
            }
        };

        for (name, claimed) in &claim.attributes {
            match item.attributes.get(name) {
                Some(AttrValue::Bool(actual)) if actual == claimed => {}
                Some(AttrValue::Bool(actual)) => records.push(HallucinationRecord {
                    kind: HallucinationKind::IncorrectAttribute,
                    claim: format!("{}: {} = {}", item.id, name, claimed),
                    actual: format!("{} = {}", name, actual),
                    severity: Severity::High,
                }),
                other => records.push(HallucinationRecord {
                    kind: HallucinationKind::IncorrectAttribute,
                    claim: format!("{}: {} = {}", item.id, name, claimed),
                    actual: match other {
                        Some(v) => format!("{} = {} (not a boolean)", name, v),
                        None => format!("{} is not in the catalog record", name),
                    },
                    severity: Severity::High,
                }),
            }
        }

        if let Some(claimed_price) = claim.price {
            if item.price > 0.0 {
                let relative = (claimed_price - item.price).abs() / item.price;
                if relative > PRICE_TOLERANCE {
                    records.push(HallucinationRecord {
                        kind: HallucinationKind::IncorrectPrice,
                        claim: format!("{}: price {}", item.id, claimed_price),
                        actual: format!("price {}", item.price),
                        severity: Severity::High,
                    });
                }
            }
        }

        if let Some(claimed_stock) = claim.in_stock {
            if claimed_stock != item.in_stock {
                records.push(HallucinationRecord {
                    kind: HallucinationKind::IncorrectAvailability,
                    claim: format!(
                        "{}: {}",
                        item.id,
                        if claimed_stock { "in stock" } else { "out of stock" }
                    ),
                    actual: if item.in_stock {
                        "in stock".to_string()
                    } else {
                        "out of stock".to_string()
                    },
                    severity: Severity::Medium,
                });
            }
        }

        let invalid: Vec<&String> = claim
            .sizes
            .iter()
            .filter(|s| !item.available_sizes.contains(*s))
            .collect();
        if !invalid.is_empty() {
            records.push(HallucinationRecord {
                kind: HallucinationKind::InvalidSizes,
                claim: format!(
                    "{}: sizes {}",
                    item.id,
                    invalid
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                actual: format!(
                    "available sizes {}",
                    item.available_sizes
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                severity: Severity::Medium,
            });
        }
    }
    records
}

/// Conservative deterministic claim extraction from answer text.
///
/// Scans sentence by sentence: an item is "claimed" when the sentence
/// mentions its name (with or without the brand). Within a claiming
/// sentence, a `$amount` becomes a price claim, stock phrases become an
/// availability claim, a mention of a boolean attribute name becomes an
/// attribute claim (negation-aware), and number tokens after "size"/"sizes"
/// become size claims. Anything the scan cannot attribute to an item is
/// ignored rather than guessed.
pub fn extract_claims(answer: &str, catalog: &CatalogStore) -> Vec<ItemClaim> {
    let mut claims: BTreeMap<ItemId, ItemClaim> = BTreeMap::new();

    for sentence in split_sentences(answer) {
        let lower = sentence.to_lowercase();
        for item in catalog.iter() {
            let name = item.name.to_lowercase();
            if name.is_empty() || !lower.contains(&name) {
                continue;
            }
            let claim = claims
                .entry(item.id.clone())
                .or_insert_with(|| ItemClaim::existence_only(item.id.clone()));

            if claim.price.is_none() {
                claim.price = parse_dollar_amount(&lower);
            }

            if lower.contains("out of stock") || lower.contains("sold out") {
                claim.in_stock = Some(false);
            } else if lower.contains("in stock") {
                claim.in_stock = Some(true);
            }

            for (attr, value) in &item.attributes {
                if !matches!(value, AttrValue::Bool(_)) {
                    continue;
                }
                if let Some(pos) = lower.find(attr.as_str()) {
                    let negated = lower[..pos].ends_with("not ")
                        || lower[..pos].ends_with("n't ")
                        || lower[..pos].ends_with("no ");
                    claim.attributes.insert(attr.clone(), !negated);
                }
            }

            claim.sizes.extend(parse_sizes(&lower));
            claim.sizes.sort();
            claim.sizes.dedup();
        }
    }

    claims.into_values().collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split(|c| c == '.' || c == '!' || c == '?' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First `$amount` in the sentence, e.g. "$149.99" or "$150".
fn parse_dollar_amount(sentence: &str) -> Option<f64> {
    let pos = sentence.find('$')?;
    let rest = &sentence[pos + 1..];
    let number: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    number.trim_end_matches('.').parse().ok()
}

/// Number tokens following the word "size" or "sizes".
fn parse_sizes(sentence: &str) -> Vec<String> {
    let mut sizes = Vec::new();
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let mut in_size_list = false;
    for token in tokens {
        let clean = token.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '.');
        if clean.eq_ignore_ascii_case("size") || clean.eq_ignore_ascii_case("sizes") {
            in_size_list = true;
            continue;
        }
        if in_size_list {
            if clean.parse::<f64>().is_ok() {
                sizes.push(clean.to_string());
            } else if !clean.eq_ignore_ascii_case("and") && !clean.is_empty() {
                in_size_list = false;
            }
        }
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoplens_core::types::Item;
    use std::collections::BTreeSet;

    fn catalog() -> CatalogStore {
        CatalogStore::from_items(vec![Item {
            id: "sku-1".to_string(),
            brand: "Peak".to_string(),
            name: "Ridge Runner".to_string(),
            family: "trail".to_string(),
            price: 200.0,
            in_stock: true,
            available_sizes: BTreeSet::from(["9".to_string(), "10".to_string()]),
            attributes: BTreeMap::from([("waterproof".to_string(), AttrValue::Bool(true))]),
        }])
        .unwrap()
    }

    #[test]
    fn price_at_tolerance_boundary_is_accepted() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-1".to_string(),
            price: Some(210.0), // relative diff exactly 0.05
            ..ItemClaim::default()
        };
        assert!(check_claims(&catalog, &[claim]).is_empty());
    }

    #[test]
    fn price_above_tolerance_is_flagged() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-1".to_string(),
            price: Some(211.0), // relative diff > 0.05
            ..ItemClaim::default()
        };
        let records = check_claims(&catalog, &[claim]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, HallucinationKind::IncorrectPrice);
        assert_eq!(records[0].severity, Severity::High);
    }

    #[test]
    fn non_existent_item_short_circuits_other_rules() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-ghost".to_string(),
            price: Some(9999.0),
            in_stock: Some(false),
            sizes: vec!["55".to_string()],
            attributes: BTreeMap::from([("waterproof".to_string(), false)]),
        };
        let records = check_claims(&catalog, &[claim]);
        assert_eq!(records.len(), 1, "only the existence record");
        assert_eq!(records[0].kind, HallucinationKind::NonExistentProduct);
        assert_eq!(records[0].severity, Severity::Critical);
    }

    #[test]
    fn wrong_boolean_attribute_is_high_severity() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-1".to_string(),
            attributes: BTreeMap::from([("waterproof".to_string(), false)]),
            ..ItemClaim::default()
        };
        let records = check_claims(&catalog, &[claim]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, HallucinationKind::IncorrectAttribute);
        assert_eq!(records[0].severity, Severity::High);
    }

    #[test]
    fn wrong_availability_is_medium_severity() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-1".to_string(),
            in_stock: Some(false),
            ..ItemClaim::default()
        };
        let records = check_claims(&catalog, &[claim]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, HallucinationKind::IncorrectAvailability);
        assert_eq!(records[0].severity, Severity::Medium);
    }

    #[test]
    fn only_the_invalid_size_subset_is_reported() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-1".to_string(),
            sizes: vec!["9".to_string(), "13".to_string(), "14".to_string()],
            ..ItemClaim::default()
        };
        let records = check_claims(&catalog, &[claim]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, HallucinationKind::InvalidSizes);
        assert!(records[0].claim.contains("13"));
        assert!(records[0].claim.contains("14"));
        assert!(!records[0].claim.contains('9'));
    }

    #[test]
    fn one_item_can_violate_multiple_rules() {
        let catalog = catalog();
        let claim = ItemClaim {
            item_id: "sku-1".to_string(),
            price: Some(300.0),
            in_stock: Some(false),
            ..ItemClaim::default()
        };
        let records = check_claims(&catalog, &[claim]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, HallucinationKind::IncorrectPrice);
        assert_eq!(records[1].kind, HallucinationKind::IncorrectAvailability);
    }

    #[test]
    fn extraction_reads_price_stock_and_negated_attribute() {
        let catalog = catalog();
        let answer = "The Ridge Runner costs $220 and is not waterproof. \
                      The Ridge Runner is out of stock.";
        let claims = extract_claims(answer, &catalog);
        assert_eq!(claims.len(), 1);
        let claim = &claims[0];
        assert_eq!(claim.item_id, "sku-1");
        assert_eq!(claim.price, Some(220.0));
        assert_eq!(claim.in_stock, Some(false));
        assert_eq!(claim.attributes.get("waterproof"), Some(&false));
    }

    #[test]
    fn extraction_reads_size_lists() {
        let catalog = catalog();
        let answer = "Ridge Runner comes in sizes 9, 10 and 13.";
        let claims = extract_claims(answer, &catalog);
        assert_eq!(claims.len(), 1);
        assert_eq!(
            claims[0].sizes,
            vec!["10".to_string(), "13".to_string(), "9".to_string()]
        );
    }

    #[test]
    fn extraction_ignores_unmentioned_items() {
        let catalog = catalog();
        let claims = extract_claims("We recommend road shoes in general.", &catalog);
        assert!(claims.is_empty());
    }
}
