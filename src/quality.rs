use serde::Serialize;

/// Colour band for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Good,
    Mid,
    Bad,
    None,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Good => "good",
            QualityTier::Mid => "mid",
            QualityTier::Bad => "bad",
            QualityTier::None => "none",
        }
    }

    /// CSS class used by the web front end; empty for `None`.
    pub fn css_class(&self) -> &'static str {
        match self {
            QualityTier::Good => "metric-good",
            QualityTier::Mid => "metric-mid",
            QualityTier::Bad => "metric-bad",
            QualityTier::None => "",
        }
    }
}

/// `(low, high)` bounds per metric.
pub const THRESHOLDS: &[(&str, (f64, f64))] = &[
    ("accuracy", (0.8, 0.9)),
    ("precision", (0.4, 0.7)),
    ("recall", (0.5, 0.8)),
    ("f1", (0.5, 0.8)),
    ("roc_auc", (0.7, 0.9)),
    ("average_precision", (0.5, 0.8)),
];

/// Nominal range assumed for metrics missing from [`THRESHOLDS`].
pub const DEFAULT_BOUNDS: (f64, f64) = (0.0, 1.0);

pub fn bounds_for(metric: &str) -> Option<(f64, f64)> {
    THRESHOLDS
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, b)| *b)
}

/// Band a metric value. `high` is inclusive for `Good`, `low` inclusive for `Mid`.
/// Out-of-range values are not clamped.
pub fn classify(metric: &str, value: Option<f64>) -> QualityTier {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return QualityTier::None,
    };
    // Unknown metrics have no mid band: anything at or above the nominal floor is good.
    let (low, high) = match bounds_for(metric) {
        Some(bounds) => bounds,
        None => (DEFAULT_BOUNDS.0, DEFAULT_BOUNDS.0),
    };
    if value >= high {
        QualityTier::Good
    } else if value >= low {
        QualityTier::Mid
    } else {
        QualityTier::Bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_boundaries() {
        assert_eq!(classify("accuracy", Some(0.9)), QualityTier::Good);
        assert_eq!(classify("accuracy", Some(0.89999)), QualityTier::Mid);
        assert_eq!(classify("accuracy", Some(0.8)), QualityTier::Mid);
        assert_eq!(classify("accuracy", Some(0.79999)), QualityTier::Bad);
    }

    #[test]
    fn test_missing_and_non_finite() {
        assert_eq!(classify("accuracy", None), QualityTier::None);
        assert_eq!(classify("recall", Some(f64::NAN)), QualityTier::None);
        assert_eq!(classify("recall", Some(f64::INFINITY)), QualityTier::None);
    }

    #[test]
    fn test_unknown_metric_has_no_mid_band() {
        assert_eq!(classify("unknown_metric", Some(0.95)), QualityTier::Good);
        assert_eq!(classify("unknown_metric", Some(0.0)), QualityTier::Good);
        assert_eq!(classify("unknown_metric", Some(1.3)), QualityTier::Good);
        assert_eq!(classify("unknown_metric", Some(-0.1)), QualityTier::Bad);
        assert_eq!(bounds_for("unknown_metric"), None);
    }

    #[test]
    fn test_no_clamping() {
        assert_eq!(classify("roc_auc", Some(1.2)), QualityTier::Good);
        assert_eq!(classify("precision", Some(-4.0)), QualityTier::Bad);
    }

    #[test]
    fn test_per_metric_table() {
        assert_eq!(classify("precision", Some(0.45)), QualityTier::Mid);
        assert_eq!(classify("precision", Some(0.7)), QualityTier::Good);
        assert_eq!(classify("recall", Some(0.49)), QualityTier::Bad);
        assert_eq!(classify("f1", Some(0.8)), QualityTier::Good);
        assert_eq!(classify("average_precision", Some(0.5)), QualityTier::Mid);
        assert_eq!(bounds_for("roc_auc"), Some((0.7, 0.9)));
    }

    #[test]
    fn test_css_class() {
        assert_eq!(QualityTier::Good.css_class(), "metric-good");
        assert_eq!(QualityTier::None.css_class(), "");
    }
}
