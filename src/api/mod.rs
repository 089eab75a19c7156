use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

mod http;
pub mod retry;
pub mod types;

pub use http::HttpApi;
pub use types::{FeatureVector, PageQuery, PredictionResponse, RunSubmission};

/// Failure categories for remote calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Connect, timeout, or body read failure.
    Transport(String),
    /// Non-2xx response.
    Status { code: u16, body: String },
    /// Body was not the JSON we could read.
    Payload(String),
    /// No secondary endpoint exists for this retrieval.
    NoFallback,
}

impl ApiError {
    /// Categories that route a read to its secondary endpoint.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Status { .. } | ApiError::Payload(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { code, .. } => retry::is_retryable_http_error(*code),
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {}", msg),
            ApiError::Status { code, body } if body.is_empty() => {
                write!(f, "server responded {}", code)
            }
            ApiError::Status { code, body } => write!(f, "server responded {}: {}", code, body),
            ApiError::Payload(msg) => write!(f, "unreadable payload: {}", msg),
            ApiError::NoFallback => write!(f, "no fallback source"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The remote model-evaluation API.
///
/// Reads return raw JSON so the response adapter can deal with shape drift.
#[async_trait]
pub trait MetricsApi: Send + Sync {
    /// `GET /api/metrics/latest`
    async fn latest(&self) -> Result<Value, ApiError>;
    /// `GET /api/metrics`, optionally paginated.
    async fn list(&self, page: Option<PageQuery>) -> Result<Value, ApiError>;
    /// `POST /api/predict`
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResponse, ApiError>;
    /// `POST /api/metrics`
    async fn record_run(&self, run: &RunSubmission) -> Result<(), ApiError>;
}
