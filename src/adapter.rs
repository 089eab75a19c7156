//! Response adapter: turns whatever envelope the backend sent into an ordered
//! list of [`MetricsRecord`]s.
//!
//! Accepted envelopes are a single record object, an array of record objects,
//! or `{items: [...], pages: n}`. Anything else (or a failed request) routes
//! to the fallback source exactly once. If that also fails the result is an
//! empty page, never an error.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiError;
use crate::logging::{log, log_fallback, obj, v_str, Domain, Level};
use crate::record::MetricsRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdaptedPage {
    pub records: Vec<MetricsRecord>,
    /// Page count reported by the backend, if any.
    pub pages: Option<u32>,
    /// Set when both sources failed.
    pub error: Option<String>,
}

impl AdaptedPage {
    pub fn total_pages(&self) -> u32 {
        self.pages.unwrap_or(1).max(1)
    }

    pub fn first(&self) -> Option<&MetricsRecord> {
        self.records.first()
    }

    fn failed(error: String) -> Self {
        Self {
            records: Vec::new(),
            pages: None,
            error: Some(error),
        }
    }
}

/// Why a payload could not be read as a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Unclassified {
    Failed(ApiError),
    Shape(&'static str),
}

impl Unclassified {
    fn describe(&self) -> String {
        match self {
            Unclassified::Failed(e) => e.to_string(),
            Unclassified::Shape(s) => format!("unexpected payload shape: {}", s),
        }
    }
}

/// Resolve one payload into a page without any fallback.
pub fn classify_payload(payload: &Value) -> Result<AdaptedPage, Unclassified> {
    match payload {
        Value::Array(items) => Ok(AdaptedPage {
            records: records_from(items),
            pages: None,
            error: None,
        }),
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => Ok(AdaptedPage {
                records: records_from(items),
                pages: ["pages", "total_pages", "totalPages"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(page_count)),
                error: None,
            }),
            Some(_) => Err(Unclassified::Shape("items is not an array")),
            None => Ok(AdaptedPage {
                records: vec![MetricsRecord::from_object(map)],
                pages: None,
                error: None,
            }),
        },
        Value::String(_) => Err(Unclassified::Shape("string")),
        Value::Number(_) => Err(Unclassified::Shape("number")),
        Value::Bool(_) => Err(Unclassified::Shape("bool")),
        Value::Null => Err(Unclassified::Shape("null")),
    }
}

fn resolve(payload: Result<Value, ApiError>) -> Result<AdaptedPage, Unclassified> {
    match payload {
        Ok(v) => classify_payload(&v),
        Err(e) => Err(Unclassified::Failed(e)),
    }
}

/// Adapt a primary payload, calling `fallback` once if it cannot be classified.
pub fn adapt<F>(payload: Result<Value, ApiError>, fallback: F) -> AdaptedPage
where
    F: FnOnce() -> Result<Value, ApiError>,
{
    match resolve(payload) {
        Ok(page) => page,
        Err(Unclassified::Failed(e)) if !e.is_fallback_trigger() => {
            no_data(Unclassified::Failed(e))
        }
        Err(primary) => {
            log_fallback(&primary.describe());
            settle(primary, resolve(fallback()))
        }
    }
}

/// Async form of [`adapt`]; the fallback future is only created when needed.
pub async fn adapt_async<F, Fut>(payload: Result<Value, ApiError>, fallback: F) -> AdaptedPage
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
{
    match resolve(payload) {
        Ok(page) => page,
        Err(Unclassified::Failed(e)) if !e.is_fallback_trigger() => {
            no_data(Unclassified::Failed(e))
        }
        Err(primary) => {
            log_fallback(&primary.describe());
            settle(primary, resolve(fallback().await))
        }
    }
}

fn settle(primary: Unclassified, secondary: Result<AdaptedPage, Unclassified>) -> AdaptedPage {
    match secondary {
        Ok(page) => page,
        Err(Unclassified::Failed(ApiError::NoFallback)) => no_data(primary),
        Err(secondary) => {
            let msg = secondary.describe();
            log(
                Level::Error,
                Domain::Adapter,
                "no_data",
                obj(&[
                    ("primary", v_str(&primary.describe())),
                    ("fallback", v_str(&msg)),
                ]),
            );
            AdaptedPage::failed(msg)
        }
    }
}

/// Terminal failure with nothing further to try.
fn no_data(primary: Unclassified) -> AdaptedPage {
    let msg = primary.describe();
    log(
        Level::Error,
        Domain::Adapter,
        "no_data",
        obj(&[("primary", v_str(&msg))]),
    );
    AdaptedPage::failed(msg)
}

/// Non-object entries are dropped.
fn records_from(items: &[Value]) -> Vec<MetricsRecord> {
    let records: Vec<MetricsRecord> = items
        .iter()
        .filter_map(Value::as_object)
        .map(MetricsRecord::from_object)
        .collect();
    if records.len() != items.len() {
        log(
            Level::Debug,
            Domain::Adapter,
            "entries_dropped",
            obj(&[(
                "count",
                serde_json::json!(items.len() - records.len()),
            )]),
        );
    }
    records
}

fn page_count(v: &Value) -> Option<u32> {
    crate::record::number(v)
        .filter(|f| *f >= 1.0)
        .map(|f| f.min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn no_fallback() -> Result<Value, ApiError> {
        Err(ApiError::NoFallback)
    }

    #[test]
    fn test_items_envelope_with_pages() {
        let page = adapt(
            Ok(json!({"items": [{"ts": "t1", "metrics": {}}], "pages": 3})),
            no_fallback,
        );
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total_pages(), 3);
        assert!(page.error.is_none());
    }

    #[test]
    fn test_array_preserves_order() {
        let page = adapt(
            Ok(json!([{"_id": "c"}, {"_id": "a"}, {"_id": "b"}])),
            no_fallback,
        );
        let ids: Vec<_> = page.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(page.pages, None);
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_single_object() {
        let page = adapt(Ok(json!({"precision": 0.5, "recall": 0.25})), no_fallback);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].metrics.recall, Some(0.25));
    }

    #[test]
    fn test_fallback_called_once_on_bad_shape() {
        let calls = Cell::new(0);
        let page = adapt(Ok(json!("not json really")), || {
            calls.set(calls.get() + 1);
            Ok(json!({"items": [{"_id": "x"}], "pages": 2}))
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(page.records[0].key, "x");
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn test_fallback_not_called_on_success() {
        let calls = Cell::new(0);
        adapt(Ok(json!([])), || {
            calls.set(calls.get() + 1);
            no_fallback()
        });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_both_sources_malformed_yield_empty() {
        let page = adapt(Ok(json!("oops")), || Ok(json!("still oops")));
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages(), 1);
        assert!(page.error.is_some());
    }

    #[test]
    fn test_transport_failure_falls_back() {
        let page = adapt(Err(ApiError::Transport("refused".into())), || {
            Ok(json!([{"_id": "fb"}]))
        });
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_non_trigger_error_skips_fallback() {
        let calls = Cell::new(0);
        let page = adapt(Err(ApiError::NoFallback), || {
            calls.set(calls.get() + 1);
            Ok(json!([{"_id": "fb"}]))
        });
        assert_eq!(calls.get(), 0);
        assert!(page.records.is_empty());
        assert_eq!(page.error.as_deref(), Some("no fallback source"));
    }

    #[test]
    fn test_idempotent() {
        let payload = json!({"items": [{"ts": "t1", "metrics": {"f1": 0.4}}, {"id": 2}], "pages": 4});
        let a = adapt(Ok(payload.clone()), no_fallback);
        let b = adapt(Ok(payload), no_fallback);
        assert_eq!(a, b);
    }

    #[test]
    fn test_items_not_array_is_unclassified() {
        assert_eq!(
            classify_payload(&json!({"items": null})),
            Err(Unclassified::Shape("items is not an array"))
        );
    }

    #[test]
    fn test_non_object_entries_dropped() {
        let page = adapt(Ok(json!([1, {"_id": "ok"}, "x"])), no_fallback);
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_bad_page_counts_ignored() {
        let page = adapt(Ok(json!({"items": [], "pages": 0})), no_fallback);
        assert_eq!(page.pages, None);
        let page = adapt(Ok(json!({"items": [], "total_pages": "5"})), no_fallback);
        assert_eq!(page.pages, Some(5));
    }

    #[tokio::test]
    async fn test_async_fallback() {
        let page = adapt_async(Err(ApiError::Status { code: 500, body: String::new() }), || async {
            Ok(json!({"items": [{"_id": "late"}]}))
        })
        .await;
        assert_eq!(page.records[0].key, "late");
    }

    #[tokio::test]
    async fn test_async_both_fail() {
        let page = adapt_async(Err(ApiError::Transport("down".into())), || async {
            Err(ApiError::Transport("also down".into()))
        })
        .await;
        assert!(page.records.is_empty());
        assert_eq!(page.error.as_deref(), Some("transport error: also down"));
    }
}
