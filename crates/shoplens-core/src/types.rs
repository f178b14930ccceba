//! Domain types shared by the retrieval engines and the evaluation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type ItemId = String;

/// A typed attribute value.
///
/// Comparisons (price tolerance, boolean equality, constraint filtering)
/// operate on the variant and fail on a type mismatch instead of coercing.
/// Variant order matters for untagged deserialization: bool and number are
/// tried before string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Num(n) => write!(f, "{}", n),
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::List(l) => {
                let parts: Vec<String> = l.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// A canonical catalog item. Immutable after catalog load; the catalog store
/// is the source of truth for all fact-checking.
///
/// - `family`: the item's type/family (e.g. "trail")
/// - `attributes`: free-form typed attributes; the `categories` key, when
///   present, is a list attribute used for `has_category` triples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub brand: String,
    pub name: String,
    pub family: String,
    pub price: f64,
    pub in_stock: bool,
    #[serde(default)]
    pub available_sizes: BTreeSet<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Item {
    /// Category labels from the `categories` list attribute, if any.
    pub fn categories(&self) -> Vec<String> {
        match self.attributes.get("categories") {
            Some(AttrValue::List(entries)) => entries.iter().map(|v| v.to_string()).collect(),
            Some(other) => vec![other.to_string()],
            None => Vec::new(),
        }
    }
}

/// Informational tag on a ground-truth query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    AttributeBased,
    BudgetConstrained,
    Conversational,
    UseCase,
    Comparison,
    #[serde(other)]
    Other,
}

impl Default for QueryCategory {
    fn default() -> Self {
        QueryCategory::Other
    }
}

/// One expected ground-truth match for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedItem {
    pub id: ItemId,
    #[serde(default)]
    pub match_reason: String,
}

/// A result pattern the ground truth marks as unacceptable for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnacceptableResult {
    pub issue: String,
    #[serde(default)]
    pub reason: String,
}

fn default_max_results() -> usize {
    10
}

/// A ground-truth query record from the input dataset.
///
/// `expected_items` is offline validation data only; retrievers never see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub category: QueryCategory,
    #[serde(default)]
    pub required_attributes: BTreeMap<String, AttrValue>,
    #[serde(default)]
    pub expected_items: Vec<ExpectedItem>,
    #[serde(default)]
    pub unacceptable_results: Vec<UnacceptableResult>,
    #[serde(default)]
    pub min_expected_results: usize,
    #[serde(default = "default_max_results")]
    pub max_acceptable_results: usize,
}

/// Which retrieval path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalPath {
    Hybrid,
    Keyword,
}

impl RetrievalPath {
    pub fn label(&self) -> &'static str {
        match self {
            RetrievalPath::Hybrid => "hybrid",
            RetrievalPath::Keyword => "keyword",
        }
    }
}

/// Ordered retrieval output for one query on one path. Produced fresh per
/// query; never persisted beyond the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub path: RetrievalPath,
    pub item_ids: Vec<ItemId>,
    pub latency_ms: u64,
}

/// Judge scores for retrieval quality, each in [1,5].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalScores {
    pub relevance: u8,
    pub coverage: u8,
    pub precision: u8,
    #[serde(default)]
    pub reasoning: String,
}

/// Judge scores for response quality, each in [1,5]. `hallucination` is
/// inverted: 5 means no hallucination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseScores {
    pub accuracy: u8,
    pub hallucination: u8,
    pub helpfulness: u8,
    pub completeness: u8,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HallucinationKind {
    NonExistentProduct,
    IncorrectAttribute,
    IncorrectPrice,
    IncorrectAvailability,
    InvalidSizes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

/// One violated fact-check rule for one claimed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallucinationRecord {
    pub kind: HallucinationKind,
    pub claim: String,
    pub actual: String,
    pub severity: Severity,
}
