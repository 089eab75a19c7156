use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

/// Feature payload for `POST /api/predict`. Numeric fields go out as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub age: i64,
    pub job: String,
    pub marital: String,
    pub education: String,
    pub default: String,
    pub balance: f64,
    pub housing: String,
    pub loan: String,
    pub contact: String,
    pub day: i64,
    pub month: String,
    pub duration: i64,
    pub campaign: i64,
    pub pdays: i64,
    pub previous: i64,
    pub poutcome: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "Prediction", alias = "prediction")]
    pub prediction: String,
    #[serde(rename = "Probability_yes", alias = "probability", default)]
    pub probability_yes: Option<f64>,
    #[serde(rename = "Modelo", alias = "model", default)]
    pub model: Option<String>,
    #[serde(default)]
    pub metrics: Option<Map<String, Value>>,
}

/// Body of `POST /api/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSubmission {
    /// ISO-8601
    pub ts: String,
    pub metrics: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_response_both_casings() {
        let a: PredictionResponse = serde_json::from_value(json!({
            "Prediction": "yes", "Probability_yes": 0.81, "Modelo": "tree"
        }))
        .unwrap();
        assert_eq!(a.prediction, "yes");
        assert_eq!(a.probability_yes, Some(0.81));
        assert_eq!(a.model.as_deref(), Some("tree"));
        assert!(a.metrics.is_none());

        let b: PredictionResponse =
            serde_json::from_value(json!({"prediction": "no", "probability": 0.2})).unwrap();
        assert_eq!(b.prediction, "no");
        assert_eq!(b.probability_yes, Some(0.2));
    }

    #[test]
    fn test_run_submission_shape() {
        let run = RunSubmission {
            ts: "2025-01-01T00:00:00.000Z".to_string(),
            metrics: Map::new(),
        };
        assert_eq!(
            serde_json::to_value(&run).unwrap(),
            json!({"ts": "2025-01-01T00:00:00.000Z", "metrics": {}})
        );
    }
}
