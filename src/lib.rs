//! Evaluation dashboard core for a loan-approval classifier.
//!
//! Fetches evaluation runs from the model API, normalizes their loosely shaped
//! payloads, and builds view models (metric cards with quality tiers, confusion
//! matrix, ROC and precision-recall series, paginated history).

pub mod adapter;
pub mod api;
pub mod config;
pub mod confusion;
pub mod curves;
pub mod dashboard;
pub mod logging;
pub mod pager;
pub mod predict;
pub mod quality;
pub mod record;
pub mod render;
pub mod view;
