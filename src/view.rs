//! Presentation models. Each fetch builds fresh values; nothing here mutates a
//! previously built view.

use serde::Serialize;

use crate::adapter::AdaptedPage;
use crate::api::PredictionResponse;
use crate::confusion::ConfusionMatrix;
use crate::curves::{build_precision_recall, build_roc_with, CurvePoint, IllustrativeRoc, RocSource};
use crate::pager::PageState;
use crate::quality::{classify, QualityTier};
use crate::record::MetricsRecord;

/// Shown wherever a value is missing. Distinct from a real zero.
pub const UNAVAILABLE: &str = "--";

pub const HISTORY_COLUMNS: [(&str, &str); 6] = [
    ("precision", "Precision"),
    ("recall", "Recall"),
    ("accuracy", "Accuracy"),
    ("f1", "F1-Score"),
    ("roc_auc", "ROC AUC"),
    ("average_precision", "Average Precision"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MetricValue {
    Available(f64),
    Unavailable,
}

impl From<Option<f64>> for MetricValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(x) if x.is_finite() => MetricValue::Available(x),
            _ => MetricValue::Unavailable,
        }
    }
}

impl MetricValue {
    pub fn as_option(&self) -> Option<f64> {
        match self {
            MetricValue::Available(x) => Some(*x),
            MetricValue::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueFormat {
    /// `0.8333` -> `83.33%`
    Percent,
    /// Fixed decimals.
    Decimal(usize),
}

pub fn format_value(value: MetricValue, format: ValueFormat) -> String {
    match (value, format) {
        (MetricValue::Unavailable, _) => UNAVAILABLE.to_string(),
        (MetricValue::Available(x), ValueFormat::Percent) => format!("{:.2}%", x * 100.0),
        (MetricValue::Available(x), ValueFormat::Decimal(places)) => format!("{:.*}", places, x),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub metric: &'static str,
    pub label: &'static str,
    pub value: MetricValue,
    pub display: String,
    pub tier: QualityTier,
    pub caption: &'static str,
}

impl MetricCard {
    fn build(
        record: &MetricsRecord,
        metric: &'static str,
        label: &'static str,
        format: ValueFormat,
        caption: &'static str,
    ) -> Self {
        let raw = record.metrics.get(metric);
        let value = MetricValue::from(raw);
        Self {
            metric,
            label,
            value,
            display: format_value(value, format),
            tier: classify(metric, value.as_option()),
            caption,
        }
    }
}

/// Data handed to a chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub color: &'static str,
    pub points: Vec<CurvePoint>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub record_key: String,
    pub model_version: String,
    pub cards: Vec<MetricCard>,
    pub summary: Vec<MetricCard>,
    pub optimal_threshold: String,
    pub confusion: ConfusionMatrix,
    pub roc: ChartSpec,
    pub precision_recall: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DashboardState {
    Ready(Box<DashboardView>),
    Empty { message: String },
}

impl DashboardView {
    pub fn from_record(record: &MetricsRecord) -> Self {
        Self::with_roc_source(record, &IllustrativeRoc)
    }

    pub fn with_roc_source(record: &MetricsRecord, roc: &dyn RocSource) -> Self {
        let m = &record.metrics;
        let cards = vec![
            MetricCard::build(
                record,
                "precision",
                "Precision",
                ValueFormat::Percent,
                "Share of positive predictions that were correct",
            ),
            MetricCard::build(
                record,
                "recall",
                "Recall",
                ValueFormat::Percent,
                "Share of positive cases identified",
            ),
            MetricCard::build(
                record,
                "accuracy",
                "Accuracy",
                ValueFormat::Percent,
                "Share of all predictions that were correct",
            ),
            MetricCard::build(
                record,
                "f1",
                "F1-Score",
                ValueFormat::Decimal(3),
                "Harmonic mean of precision and recall",
            ),
        ];
        let summary = vec![
            MetricCard::build(
                record,
                "roc_auc",
                "AUC-ROC",
                ValueFormat::Decimal(3),
                "Area under the ROC curve",
            ),
            MetricCard::build(
                record,
                "average_precision",
                "Average Precision",
                ValueFormat::Decimal(3),
                "Area under the PR curve",
            ),
        ];
        let roc_auc = format_value(m.roc_auc.into(), ValueFormat::Decimal(3));
        let avg_precision = format_value(m.average_precision.into(), ValueFormat::Decimal(3));
        Self {
            record_key: record.key.clone(),
            model_version: record
                .model_version
                .clone()
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            cards,
            summary,
            optimal_threshold: format_value(m.optimal_threshold().into(), ValueFormat::Decimal(2)),
            confusion: m.confusion_matrix,
            roc: ChartSpec {
                title: "ROC Curve",
                x_label: "False Positive Rate",
                y_label: "True Positive Rate",
                color: "#2563eb",
                points: build_roc_with(roc, m),
                footer: format!("Area under the curve: {}", roc_auc),
            },
            precision_recall: ChartSpec {
                title: "Precision-Recall Curve",
                x_label: "Recall",
                y_label: "Precision",
                color: "#16a34a",
                points: build_precision_recall(m),
                footer: format!("Average precision: {}", avg_precision),
            },
        }
    }
}

impl DashboardState {
    /// First record of the page, or the empty state.
    pub fn from_page(page: &AdaptedPage) -> Self {
        match page.first() {
            Some(record) => DashboardState::Ready(Box::new(DashboardView::from_record(record))),
            None => DashboardState::Empty {
                message: page
                    .error
                    .clone()
                    .unwrap_or_else(|| "No metrics available yet".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryCell {
    pub value: MetricValue,
    pub display: String,
    pub tier: QualityTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub key: String,
    pub date: String,
    pub cells: Vec<HistoryCell>,
}

impl HistoryRow {
    pub fn from_record(record: &MetricsRecord) -> Self {
        let cells = HISTORY_COLUMNS
            .iter()
            .map(|(metric, _)| {
                let value = MetricValue::from(record.metrics.get(metric));
                HistoryCell {
                    value,
                    display: format_value(value, ValueFormat::Decimal(3)),
                    tier: classify(metric, value.as_option()),
                }
            })
            .collect();
        Self {
            key: record.key.clone(),
            date: record
                .timestamp
                .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
    pub empty_message: Option<String>,
    pub error: Option<String>,
    pub page: PageState,
    pub page_label: String,
    pub can_prev: bool,
    pub can_next: bool,
}

impl HistoryView {
    pub fn build(page: &AdaptedPage, state: PageState) -> Self {
        let rows: Vec<HistoryRow> = page.records.iter().map(HistoryRow::from_record).collect();
        let error = page
            .error
            .as_ref()
            .map(|e| format!("Error loading history: {}", e));
        Self {
            empty_message: (rows.is_empty() && error.is_none())
                .then(|| "No data to show".to_string()),
            rows,
            error,
            page: state,
            page_label: format!("Page {} of {}", state.current_page, state.total_pages),
            can_prev: state.can_prev(),
            can_next: state.can_next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub approved: bool,
    pub label: String,
    pub headline: &'static str,
    pub probability: Option<String>,
    pub model: Option<String>,
}

impl PredictionOutcome {
    pub fn from_response(resp: &PredictionResponse) -> Self {
        let approved = resp.prediction == "yes";
        Self {
            approved,
            label: resp.prediction.clone(),
            headline: if approved {
                "Eligible for the loan"
            } else {
                "Not eligible for the loan"
            },
            probability: resp
                .probability_yes
                .filter(|p| p.is_finite())
                .map(|p| format!("{:.2}%", p * 100.0)),
            model: resp.model.clone(),
        }
    }
}
