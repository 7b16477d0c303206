//! # Covidash - COVID-19 analytics pipeline and report backend
//!
//! Covidash loads four fixed COVID-19 CSV datasets, derives the columns the
//! dashboard charts need, and serves ready-to-chart report pages to an
//! external frontend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV Files  │────▶│   Loader    │────▶│  Derive +   │────▶│   Report    │
//! │  (4 fixed)  │     │  (cached)   │     │   Query     │     │  (rows+cols)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use covidash::{DatasetCache, ReportPage, ReportParams};
//!
//! let cache = DatasetCache::new("data");
//! let datasets = cache.get()?;
//! let report = covidash::render(ReportPage::WorstAffected, &ReportParams::default(), &datasets)?;
//! println!("{} sections", report.sections.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Typed records for the four tables
//! - [`loader`] - CSV loading with encoding detection, and export
//! - [`derive`] - Derived-column computation
//! - [`query`] - Top-N, category filter, latest-row selection
//! - [`cache`] - Memoized loading with explicit invalidation
//! - [`reports`] - The report page enumeration and rendering
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod loader;

// Derivation and selection
pub mod derive;
pub mod query;

// Caching
pub mod cache;

// Report pages
pub mod reports;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    DatasetError, DatasetResult, DeriveError, DeriveResult, QueryError, QueryResult, ReportError,
    ReportResult, ServerError, ServerResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CountryRecord, CountyRecord, Dataset, Datasets, DaywiseRecord, TimeSeriesRecord,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{detect_encoding, export_csv, load_datasets};

// =============================================================================
// Re-exports - Derivation
// =============================================================================

pub use derive::{active_cases, growth_rates, recovery_rates, CaseCounts};

// =============================================================================
// Re-exports - Queries
// =============================================================================

pub use query::{
    distinct_categories, filter_by_category, latest, top_n, top_n_by_value, CategoryColumn,
    Dated, NumericColumn, TableRow,
};

// =============================================================================
// Re-exports - Cache
// =============================================================================

pub use cache::DatasetCache;

// =============================================================================
// Re-exports - Reports
// =============================================================================

pub use reports::{
    render, ChartKind, Report, ReportPage, ReportParameter, ReportParams, ReportSection,
    ReportTable,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CacheClearResponse, PageInfo, PagesResponse, ReportResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
