//! Raw card JSON → [`Record`].
//!
//! [`normalize`] is total: any JSON value, including non-objects, yields a
//! record. Lookups go through `Value::get`/`Value::pointer`, which return
//! `None` on missing keys and on non-object intermediates alike.

use serde_json::Value;

use crate::models::{scalar_text, Record};

const PRICE_POINTERS: [&str; 2] = ["/cardmarket/prices/lowPrice", "/cardmarket/prices/low"];

pub fn normalize(raw: &Value) -> Record {
    Record {
        id: raw.get("id").filter(|v| !v.is_null()).cloned(),
        name: raw.get("name").and_then(scalar_text).unwrap_or_default(),
        set: set_label(raw),
        number: raw
            .get("number")
            .filter(|v| scalar_text(v).is_some())
            .cloned(),
        rarity: non_empty_text(raw.get("rarity")),
        image: non_empty_text(raw.pointer("/images/small")),
        price_low: price_low(raw),
        updated_at: non_empty_text(raw.pointer("/cardmarket/updatedAt")),
    }
}

/// `set` wins over `setName`; a `set` object contributes its `name`.
fn set_label(raw: &Value) -> Option<String> {
    let from_set = match raw.get("set") {
        Some(set) if set.is_object() => non_empty_text(set.get("name")),
        other => non_empty_text(other),
    };
    from_set.or_else(|| non_empty_text(raw.get("setName")))
}

fn price_low(raw: &Value) -> f64 {
    PRICE_POINTERS
        .iter()
        .filter_map(|p| raw.pointer(p))
        .find_map(Value::as_f64)
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0)
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_text).filter(|s| !s.is_empty())
}
