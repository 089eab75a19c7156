//! Async glue between the remote API and the view models.

use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Map;
use tokio::sync::watch;

use crate::adapter::{adapt_async, AdaptedPage};
use crate::api::{ApiError, MetricsApi, RunSubmission};
use crate::logging::{log, log_prediction, obj, v_str, Domain, Level};
use crate::pager::{Completion, HistoryPager, PageRequest, PageState};
use crate::predict::{FormError, PredictionForm};
use crate::view::{DashboardState, HistoryView, PredictionOutcome};

/// User-facing message for any failed prediction.
pub const PREDICTION_FAILED: &str = "Prediction failed. Check the fields.";

/// Why a prediction produced no outcome. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Form(FormError),
    Failed,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Form(e) => write!(f, "{}", e),
            SubmitError::Failed => f.write_str(PREDICTION_FAILED),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<FormError> for SubmitError {
    fn from(e: FormError) -> Self {
        SubmitError::Form(e)
    }
}

/// Latest run: `/api/metrics/latest`, falling back to `/api/metrics`.
pub async fn fetch_latest(api: &dyn MetricsApi) -> AdaptedPage {
    let primary = api.latest().await;
    adapt_async(primary, || api.list(None)).await
}

pub async fn load_dashboard(api: &dyn MetricsApi) -> DashboardState {
    DashboardState::from_page(&fetch_latest(api).await)
}

// =============================================================================
// Refresh signal
// =============================================================================

/// Broadcasts "history is stale" to open sessions.
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn raise(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// History
// =============================================================================

/// One open history view: pager state plus the page currently shown.
pub struct HistorySession {
    api: Arc<dyn MetricsApi>,
    pager: HistoryPager,
    refresh: watch::Receiver<u64>,
    view: HistoryView,
}

impl HistorySession {
    pub fn new(api: Arc<dyn MetricsApi>, page_size: u32, signal: &RefreshSignal) -> Self {
        let pager = HistoryPager::new(page_size);
        let view = HistoryView::build(&AdaptedPage::default(), pager.state());
        Self {
            api,
            pager,
            refresh: signal.subscribe(),
            view,
        }
    }

    pub fn view(&self) -> &HistoryView {
        &self.view
    }

    pub fn state(&self) -> PageState {
        self.pager.state()
    }

    /// Issue a request without awaiting it. Pair with [`Self::finish`].
    pub fn begin(&mut self, page: u32) -> PageRequest {
        self.pager.go_to_page(page)
    }

    pub async fn retrieve(api: &dyn MetricsApi, req: PageRequest) -> AdaptedPage {
        let primary = api.list(Some(req.query())).await;
        adapt_async(primary, || async { Err(ApiError::NoFallback) }).await
    }

    /// Apply a finished retrieval; stale tickets leave the view untouched.
    pub fn finish(&mut self, req: &PageRequest, page: &AdaptedPage) -> Completion {
        let outcome = self.pager.complete(req, page);
        if let Completion::Applied { .. } = outcome {
            self.view = HistoryView::build(page, self.pager.state());
        }
        outcome
    }

    async fn run(&mut self, req: PageRequest) -> &HistoryView {
        let page = Self::retrieve(self.api.as_ref(), req).await;
        self.finish(&req, &page);
        &self.view
    }

    pub async fn go_to_page(&mut self, n: u32) -> &HistoryView {
        let req = self.pager.go_to_page(n);
        self.run(req).await
    }

    pub async fn next(&mut self) -> &HistoryView {
        match self.pager.next() {
            Some(req) => self.run(req).await,
            None => &self.view,
        }
    }

    pub async fn prev(&mut self) -> &HistoryView {
        match self.pager.prev() {
            Some(req) => self.run(req).await,
            None => &self.view,
        }
    }

    pub async fn refresh(&mut self) -> &HistoryView {
        let req = self.pager.on_refresh_signal();
        self.run(req).await
    }

    /// Re-fetch the current page if the refresh signal fired since last check.
    pub async fn refresh_if_signalled(&mut self) -> bool {
        match self.refresh.has_changed() {
            Ok(true) => {
                let _ = self.refresh.borrow_and_update();
                self.refresh().await;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Prediction
// =============================================================================

/// Submit the form, record the run, and raise the refresh signal.
///
/// Every failure before a prediction comes back collapses into one
/// human-readable message. Failing to record the run is only logged.
pub async fn submit_prediction(
    api: &dyn MetricsApi,
    form: &PredictionForm,
    signal: &RefreshSignal,
) -> Result<PredictionOutcome, SubmitError> {
    let features = form.to_features()?;
    let response = match api.predict(&features).await {
        Ok(r) => r,
        Err(e) => {
            log(
                Level::Error,
                Domain::Predict,
                "prediction_failed",
                obj(&[("error", v_str(&e.to_string()))]),
            );
            return Err(SubmitError::Failed);
        }
    };
    let run = RunSubmission {
        ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        metrics: response.metrics.clone().unwrap_or_else(Map::new),
    };
    let recorded = match api.record_run(&run).await {
        Ok(()) => {
            signal.raise();
            true
        }
        Err(e) => {
            log(
                Level::Warn,
                Domain::Predict,
                "record_run_failed",
                obj(&[("error", v_str(&e.to_string()))]),
            );
            false
        }
    };
    log_prediction(&response.prediction, response.probability_yes, recorded);
    Ok(PredictionOutcome::from_response(&response))
}
