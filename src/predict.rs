//! Prediction form capture.

use std::collections::BTreeMap;
use std::fmt;

use crate::api::FeatureVector;

pub const FORM_FIELDS: [&str; 16] = [
    "age", "job", "marital", "education", "default", "balance", "housing", "loan", "contact",
    "day", "month", "duration", "campaign", "pdays", "previous", "poutcome",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Missing(&'static str),
    NotNumeric { field: &'static str, value: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing(field) => write!(f, "Field '{}' is required.", field),
            FormError::NotNumeric { field, value } => {
                write!(f, "Field '{}' must be a number (got '{}').", field, value)
            }
        }
    }
}

impl std::error::Error for FormError {}

/// Raw string values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionForm {
    values: BTreeMap<&'static str, String>,
}

impl PredictionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match FORM_FIELDS.iter().find(|f| **f == name) {
            Some(field) => {
                self.values.insert(*field, value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::new();
        for (k, v) in pairs {
            form.set(k, v);
        }
        form
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn text(&self, field: &'static str) -> Result<String, FormError> {
        match self.values.get(field).map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(FormError::Missing(field)),
        }
    }

    fn float(&self, field: &'static str) -> Result<f64, FormError> {
        let raw = self.text(field)?;
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or(FormError::NotNumeric { field, value: raw })
    }

    fn int(&self, field: &'static str) -> Result<i64, FormError> {
        let raw = self.text(field)?;
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(v);
        }
        // "30.0" style input from number widgets
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
            _ => Err(FormError::NotNumeric { field, value: raw }),
        }
    }

    pub fn to_features(&self) -> Result<FeatureVector, FormError> {
        Ok(FeatureVector {
            age: self.int("age")?,
            job: self.text("job")?,
            marital: self.text("marital")?,
            education: self.text("education")?,
            default: self.text("default")?,
            balance: self.float("balance")?,
            housing: self.text("housing")?,
            loan: self.text("loan")?,
            contact: self.text("contact")?,
            day: self.int("day")?,
            month: self.text("month")?,
            duration: self.int("duration")?,
            campaign: self.int("campaign")?,
            pdays: self.int("pdays")?,
            previous: self.int("previous")?,
            poutcome: self.text("poutcome")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_form() -> PredictionForm {
        PredictionForm::from_pairs([
            ("age", "41"),
            ("job", "technician"),
            ("marital", "married"),
            ("education", "secondary"),
            ("default", "no"),
            ("balance", "1270.5"),
            ("housing", "yes"),
            ("loan", "no"),
            ("contact", "cellular"),
            ("day", "5"),
            ("month", "may"),
            ("duration", "1389"),
            ("campaign", "1"),
            ("pdays", "-1"),
            ("previous", "0"),
            ("poutcome", "unknown"),
        ])
    }

    #[test]
    fn test_full_form_converts() {
        let features = sample_form().to_features().unwrap();
        assert_eq!(features.age, 41);
        assert_eq!(features.pdays, -1);
        assert_eq!(features.balance, 1270.5);
        let body = serde_json::to_value(&features).unwrap();
        assert_eq!(body["age"], json!(41));
        assert_eq!(body["default"], json!("no"));
        assert_eq!(body["month"], json!("may"));
    }

    #[test]
    fn test_missing_field() {
        let mut form = sample_form();
        form.set("job", "  ");
        assert_eq!(form.to_features(), Err(FormError::Missing("job")));
    }

    #[test]
    fn test_non_numeric_field() {
        let mut form = sample_form();
        form.set("campaign", "two");
        let err = form.to_features().unwrap_err();
        assert_eq!(err.to_string(), "Field 'campaign' must be a number (got 'two').");
    }

    #[test]
    fn test_integral_float_accepted() {
        let mut form = sample_form();
        form.set("day", "12.0");
        assert_eq!(form.to_features().unwrap().day, 12);
        form.set("day", "12.5");
        assert!(form.to_features().is_err());
    }

    #[test]
    fn test_unknown_field_ignored() {
        let mut form = PredictionForm::new();
        assert!(!form.set("salary", "100"));
        assert!(form.set("age", "30"));
        assert_eq!(form.get("age"), Some("30"));
    }
}
