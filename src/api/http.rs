use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::retry::{retry_async, RetryConfig};
use super::types::{FeatureVector, PageQuery, PredictionResponse, RunSubmission};
use super::{ApiError, MetricsApi};
use crate::config::Config;
use crate::logging::log_fetch;

/// reqwest-backed client for the evaluation API.
pub struct HttpApi {
    client: Client,
    base: Url,
    retry: RetryConfig,
}

impl HttpApi {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        let mut base = Url::parse(&cfg.base_url)?;
        // keep any path prefix when joining endpoint paths
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            retry: cfg.retry.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Transport(format!("bad url {}: {}", path, e)))
    }

    pub fn metrics_url(&self, page: Option<PageQuery>) -> Result<Url, ApiError> {
        let mut url = self.endpoint("api/metrics")?;
        if let Some(q) = page {
            url.query_pairs_mut()
                .append_pair("page", &q.page.to_string())
                .append_pair("limit", &q.limit.to_string());
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        let label = url.path().to_string();
        let result = retry_async(&self.retry, &label, || {
            let url = url.clone();
            async move {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(transport)?;
                read_json(resp).await
            }
        })
        .await;
        log_fetch("GET", &label, result.as_ref().err());
        result
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

async fn read_json(resp: Response) -> Result<Value, ApiError> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Payload(e.to_string()))
}

#[async_trait]
impl MetricsApi for HttpApi {
    async fn latest(&self) -> Result<Value, ApiError> {
        let url = self.endpoint("api/metrics/latest")?;
        self.get_json(url).await
    }

    async fn list(&self, page: Option<PageQuery>) -> Result<Value, ApiError> {
        let url = self.metrics_url(page)?;
        self.get_json(url).await
    }

    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResponse, ApiError> {
        let url = self.endpoint("api/predict")?;
        let resp = self
            .client
            .post(url)
            .json(features)
            .send()
            .await
            .map_err(transport);
        let result = match resp {
            Ok(resp) => read_json(resp).await.and_then(|body| {
                serde_json::from_value(body).map_err(|e| ApiError::Payload(e.to_string()))
            }),
            Err(e) => Err(e),
        };
        log_fetch("POST", "/api/predict", result.as_ref().err());
        result
    }

    async fn record_run(&self, run: &RunSubmission) -> Result<(), ApiError> {
        let url = self.endpoint("api/metrics")?;
        let result = match self.client.post(url).json(run).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(ApiError::Status {
                code: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
            Err(e) => Err(transport(e)),
        };
        log_fetch("POST", "/api/metrics", result.as_ref().err());
        result
    }
}
