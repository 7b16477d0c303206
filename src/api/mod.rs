//! HTTP API for the dashboard frontend.
//!
//! - [`server`] - axum router and handlers
//! - [`types`] - response envelopes
//! - [`logs`] - SSE log streaming

pub mod logs;
pub mod server;
pub mod types;
