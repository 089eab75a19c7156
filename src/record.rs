//! Run records as they come off the wire.
//!
//! Parsing is lenient: every field is optional and a record with no `metrics`
//! object is read as its own metric set.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::confusion::{normalize, ConfusionMatrix};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSet {
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub accuracy: Option<f64>,
    pub f1: Option<f64>,
    pub roc_auc: Option<f64>,
    pub average_precision: Option<f64>,
    pub decision_threshold: Option<f64>,
    /// `thresholds.best_f1` when reported.
    pub best_f1_threshold: Option<f64>,
    pub confusion_matrix: ConfusionMatrix,
}

impl MetricSet {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let num = |key: &str| map.get(key).and_then(number);
        Self {
            precision: num("precision"),
            recall: num("recall"),
            accuracy: num("accuracy"),
            f1: num("f1").or_else(|| num("f1_score")),
            roc_auc: num("roc_auc"),
            average_precision: num("average_precision"),
            decision_threshold: num("decision_threshold"),
            best_f1_threshold: map
                .get("thresholds")
                .and_then(|t| t.get("best_f1"))
                .and_then(number),
            confusion_matrix: normalize(map.get("confusion_matrix")),
        }
    }

    /// Look up a scalar metric by wire name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "precision" => self.precision,
            "recall" => self.recall,
            "accuracy" => self.accuracy,
            "f1" => self.f1,
            "roc_auc" => self.roc_auc,
            "average_precision" => self.average_precision,
            "decision_threshold" => self.decision_threshold,
            _ => None,
        }
    }

    /// Threshold to show as "optimal": `thresholds.best_f1`, else `decision_threshold`.
    pub fn optimal_threshold(&self) -> Option<f64> {
        self.best_f1_threshold.or(self.decision_threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub model_version: Option<String>,
    pub metrics: MetricSet,
    /// Content-derived key, stable for identical payloads.
    pub key: String,
}

impl MetricsRecord {
    /// Build a record from one JSON object.
    pub fn from_object(map: &Map<String, Value>) -> Self {
        let metrics = match map.get("metrics") {
            Some(Value::Object(inner)) => MetricSet::from_map(inner),
            _ => MetricSet::from_map(map),
        };
        let id = ["_id", "id", "run_id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(identifier));
        let timestamp = ["ts", "timestamp", "created_at"]
            .iter()
            .find_map(|k| map.get(*k).and_then(parse_timestamp));
        let model_version = map.get("model_version").and_then(identifier);
        let key = match &id {
            Some(id) => id.clone(),
            None => content_key(map),
        };
        Self {
            id,
            timestamp,
            model_version,
            metrics,
            key,
        }
    }
}

/// Coerce a JSON value into a finite float. Numeric strings are accepted.
pub fn number(v: &Value) -> Option<f64> {
    let f = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn identifier(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(o) => o.get("$oid").and_then(identifier),
        _ => None,
    }
}

/// Accepts RFC3339, naive ISO-8601 (read as UTC), or epoch seconds/milliseconds.
pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if raw > 10_000_000_000 {
                DateTime::from_timestamp_millis(raw)
            } else {
                DateTime::from_timestamp(raw, 0)
            }
        }
        _ => None,
    }
}

fn content_key(map: &Map<String, Value>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Value::Object(map.clone()).to_string().as_bytes());
    let digest = hasher.finalize();
    format!("anon-{}", &hex::encode(digest)[..12])
}
