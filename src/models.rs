//! Core data models shared by the loader, index, and protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A catalog card after normalization.
///
/// Every field is always present. Missing source data is an explicit
/// `null` (or `""` for `name`, `0` for `price_low`), never an omitted key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque identifier, string or number as delivered by the source.
    pub id: Option<Value>,
    pub name: String,
    pub set: Option<String>,
    /// Ordinal within the set. Sources send both `"25"` and `25`.
    pub number: Option<Value>,
    pub rarity: Option<String>,
    pub image: Option<String>,
    /// Lowest market price; always finite and non-negative.
    pub price_low: f64,
    pub updated_at: Option<String>,
}

impl Record {
    /// The id rendered as plain text, for comparisons across JSON types.
    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().and_then(scalar_text)
    }

    /// The set number rendered as plain text.
    pub fn number_text(&self) -> Option<String> {
        self.number.as_ref().and_then(scalar_text)
    }
}

/// A matched record and its relevance score (lower is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "_score")]
    pub score: f64,
}

/// Render a JSON scalar as text. Arrays, objects, and null have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
