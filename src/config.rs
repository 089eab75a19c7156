use crate::api::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://bank-marketing-ml-mvc.onrender.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub page_size: u32,
    pub http_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let retry = RetryConfig {
            max_retries: std::env::var("FETCH_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(1),
            base_delay_ms: std::env::var("RETRY_BASE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(100),
            ..Default::default()
        };
        Self {
            base_url: std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            page_size: std::env::var("PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(10u32).max(1),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            retry,
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            page_size: 10,
            http_timeout_secs: 10,
            retry: RetryConfig::default(),
        }
    }
}
