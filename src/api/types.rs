//! REST API types for the dashboard frontend.
//!
//! Every response carries a request id so the frontend can correlate SSE log
//! entries with the request that produced them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::reports::{Report, ReportPage, ReportParams, ReportSection};

/// One page in the `/api/pages` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Sidebar label.
    pub label: String,
    /// URL-safe identifier for `/api/report/{page}`.
    pub slug: String,
    /// Dataset slugs the page reads.
    pub datasets: Vec<String>,
    /// Query parameter the page accepts, if any.
    pub parameter: Option<String>,
    /// Chart kinds the page's sections request.
    pub charts: Vec<String>,
}

impl From<ReportPage> for PageInfo {
    fn from(page: ReportPage) -> Self {
        PageInfo {
            label: page.label().to_string(),
            slug: page.slug().to_string(),
            datasets: page.datasets().iter().map(|d| d.slug().to_string()).collect(),
            parameter: page.parameter().map(|p| p.name().to_string()),
            charts: page.charts().iter().map(|c| c.as_str().to_string()).collect(),
        }
    }
}

/// Response for `/api/pages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesResponse {
    pub request_id: String,
    pub pages: Vec<PageInfo>,
}

impl PagesResponse {
    pub fn new() -> Self {
        PagesResponse {
            request_id: Uuid::new_v4().to_string(),
            pages: ReportPage::ALL.into_iter().map(PageInfo::from).collect(),
        }
    }
}

impl Default for PagesResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response for `/api/report/{page}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub request_id: String,
    pub page: String,
    pub label: String,
    pub description: String,
    /// Parameters actually applied, with defaults resolved.
    pub params: ReportParams,
    /// Valid parameter values for the UI selector, when the page takes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    pub sections: Vec<ReportSection>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        ReportResponse {
            request_id: Uuid::new_v4().to_string(),
            page: report.page.to_string(),
            label: report.label.to_string(),
            description: report.description,
            params: report.params,
            choices: report.choices,
            sections: report.sections,
        }
    }
}

/// Response for `/api/cache/clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearResponse {
    pub request_id: String,
    /// Whether a memoized load was actually discarded.
    pub was_loaded: bool,
}

impl CacheClearResponse {
    pub fn new(was_loaded: bool) -> Self {
        CacheClearResponse {
            request_id: Uuid::new_v4().to_string(),
            was_loaded,
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
