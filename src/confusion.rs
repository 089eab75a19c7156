//! Confusion-matrix ingestion.
//!
//! Backends report the matrix in several shapes. Parsing first classifies the
//! raw value into a [`RawConfusion`] variant, then every variant folds into the
//! same canonical [`ConfusionMatrix`]. Nothing here fails: unreadable input
//! becomes zero counts.

use serde::Serialize;
use serde_json::{Map, Value};

/// Canonical 2x2 layout `[[tn, fp], [fn, tp]]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tn: u64,
    pub fp: u64,
    pub fn_: u64,
    pub tp: u64,
}

impl ConfusionMatrix {
    pub fn grid(&self) -> [[u64; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn total(&self) -> u64 {
        self.tn
            .saturating_add(self.fp)
            .saturating_add(self.fn_)
            .saturating_add(self.tp)
    }

    /// Labelled cells in display order.
    pub fn cells(&self) -> [(&'static str, u64); 4] {
        [("TN", self.tn), ("FP", self.fp), ("FN", self.fn_), ("TP", self.tp)]
    }
}

/// Shape of a confusion matrix as received.
#[derive(Debug, Clone, PartialEq)]
pub enum RawConfusion<'a> {
    /// `[[tn, fp], [fn, tp]]`
    Nested(&'a [Value]),
    /// `{tn, fp, fn, tp}`, possibly with positional `"0".."3"` keys.
    Named(&'a Map<String, Value>),
    /// `[tn, fp, fn, tp]`
    Flat(&'a [Value]),
    Absent,
}

const NAMED_KEYS: [&str; 4] = ["tn", "fp", "fn", "tp"];

impl<'a> RawConfusion<'a> {
    pub fn parse(raw: Option<&'a Value>) -> Self {
        match raw {
            Some(Value::Array(items)) if items.iter().any(Value::is_array) => {
                RawConfusion::Nested(items)
            }
            Some(Value::Array(items)) => RawConfusion::Flat(items),
            Some(Value::Object(map)) => RawConfusion::Named(map),
            _ => RawConfusion::Absent,
        }
    }

    pub fn into_matrix(self) -> ConfusionMatrix {
        match self {
            RawConfusion::Nested(rows) => {
                let cell = |r: usize, c: usize| {
                    rows.get(r)
                        .and_then(Value::as_array)
                        .and_then(|row| row.get(c))
                        .map(count)
                        .unwrap_or(0)
                };
                ConfusionMatrix {
                    tn: cell(0, 0),
                    fp: cell(0, 1),
                    fn_: cell(1, 0),
                    tp: cell(1, 1),
                }
            }
            RawConfusion::Flat(items) => {
                let [tn, fp, fn_, tp] =
                    [0, 1, 2, 3].map(|i| items.get(i).map(count).unwrap_or(0));
                ConfusionMatrix { tn, fp, fn_, tp }
            }
            RawConfusion::Named(map) => {
                let mut cells = [0u64; 4];
                for (idx, key) in NAMED_KEYS.iter().enumerate() {
                    cells[idx] = map
                        .get(*key)
                        .or_else(|| map.get(&idx.to_string()))
                        .map(count)
                        .unwrap_or(0);
                }
                let [tn, fp, fn_, tp] = cells;
                ConfusionMatrix { tn, fp, fn_, tp }
            }
            RawConfusion::Absent => ConfusionMatrix::default(),
        }
    }
}

/// Normalize any raw confusion-matrix value into the canonical grid.
pub fn normalize(raw: Option<&Value>) -> ConfusionMatrix {
    RawConfusion::parse(raw).into_matrix()
}

/// Read a single count. Negative, NaN and non-numeric cells read as 0;
/// finite fractional counts truncate toward zero.
fn count(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| f as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> ConfusionMatrix {
        ConfusionMatrix { tn: 50, fp: 7, fn_: 4, tp: 39 }
    }

    #[test]
    fn test_all_shapes_agree() {
        let nested = json!([[50, 7], [4, 39]]);
        let named = json!({"tn": 50, "fp": 7, "fn": 4, "tp": 39});
        let flat = json!([50, 7, 4, 39]);
        let positional = json!({"0": 50, "1": 7, "2": 4, "3": 39});

        assert_eq!(normalize(Some(&nested)), expected());
        assert_eq!(normalize(Some(&named)), expected());
        assert_eq!(normalize(Some(&flat)), expected());
        assert_eq!(normalize(Some(&positional)), expected());
    }

    #[test]
    fn test_absent_and_empty_are_zero() {
        assert_eq!(normalize(None).grid(), [[0, 0], [0, 0]]);
        assert_eq!(normalize(Some(&json!({}))).grid(), [[0, 0], [0, 0]]);
        assert_eq!(normalize(Some(&Value::Null)).grid(), [[0, 0], [0, 0]]);
        assert_eq!(normalize(Some(&json!("oops"))).grid(), [[0, 0], [0, 0]]);
    }

    #[test]
    fn test_nested_missing_cells_default_to_zero() {
        let partial = json!([[3]]);
        assert_eq!(normalize(Some(&partial)).grid(), [[3, 0], [0, 0]]);

        let ragged = json!([[1, 2], [5]]);
        assert_eq!(normalize(Some(&ragged)).grid(), [[1, 2], [5, 0]]);
    }

    #[test]
    fn test_nested_detected_by_any_inner_sequence() {
        let mixed = json!([9, [4, 6]]);
        // row 0 is not a sequence, so its cells read as zero
        assert_eq!(normalize(Some(&mixed)).grid(), [[0, 0], [4, 6]]);
    }

    #[test]
    fn test_named_keys_win_over_positions() {
        let both = json!({"tn": 1, "0": 99, "fp": 2, "3": 8});
        assert_eq!(normalize(Some(&both)).grid(), [[1, 2], [0, 8]]);
    }

    #[test]
    fn test_garbage_cells_degrade() {
        let junk = json!({"tn": null, "fp": "12", "fn": -3, "tp": 7.9});
        assert_eq!(normalize(Some(&junk)).grid(), [[0, 12], [0, 7]]);
    }

    #[test]
    fn test_short_flat_sequence() {
        let short = json!([5, 6]);
        assert_eq!(normalize(Some(&short)).grid(), [[5, 6], [0, 0]]);
        assert_eq!(normalize(Some(&json!([]))).total(), 0);
    }

    #[test]
    fn test_cells_order() {
        let labels: Vec<&str> = expected().cells().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["TN", "FP", "FN", "TP"]);
        assert_eq!(expected().total(), 100);
    }
}
