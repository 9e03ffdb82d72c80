/// Success envelope helpers
///
/// Every successful response is wrapped as
/// `{"status": "success", "data": {...}}`; list endpoints additionally carry
/// a top-level `results` count. Error envelopes live in [`crate::error`].

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Wraps a payload in the success envelope under the given key
pub fn success<T: Serialize>(key: &str, data: T) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": { key: data },
    }))
}

/// Wraps a list payload in the success envelope with a `results` count
pub fn success_with_results<T: Serialize>(key: &str, items: Vec<T>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "results": items.len(),
        "data": { key: items },
    }))
}
