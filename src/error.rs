//! Error types for the covidash report pipeline.
//!
//! This module defines a hierarchy of error types, one per pipeline layer:
//!
//! - [`DatasetError`] - dataset loading and export errors
//! - [`DeriveError`] - derived-column computation errors
//! - [`QueryError`] - selection/aggregation errors
//! - [`ReportError`] - top-level report rendering errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors during dataset loading or export.
///
/// All variants are fatal for the current load: the caller must not proceed
/// with partial data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A required input file does not exist at the expected path.
    #[error("File not found: {0}")]
    MissingFile(String),

    /// Failed to read a file that exists.
    #[error("Failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// File exists but cannot be parsed as tabular data.
    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// File bytes could not be decoded with the detected encoding.
    #[error("Failed to decode {file} as {encoding}")]
    Encoding { file: String, encoding: String },

    /// File parsed but contains no data rows.
    #[error("Dataset file is empty: {0}")]
    EmptyFile(String),
}

// =============================================================================
// Derivation Errors
// =============================================================================

/// Errors during derived-column computation.
#[derive(Debug, Error)]
pub enum DeriveError {
    /// A table-wide statistic (e.g. the growth-rate mean) has no rows to
    /// compute over.
    #[error("Cannot compute {0} over an empty table")]
    EmptyTable(&'static str),
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors from selection and aggregation operations.
///
/// These indicate programming/config errors rather than runtime data errors
/// and should fail loudly during development.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A selection referenced a column the table does not carry.
    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn {
        table: &'static str,
        column: &'static str,
    },

    /// A derived value vector is not aligned with the rows it rates.
    #[error("Derived column length {values} does not match row count {rows}")]
    ColumnLengthMismatch { rows: usize, values: usize },
}

// =============================================================================
// Report Errors (top-level)
// =============================================================================

/// Top-level report rendering errors.
///
/// This is the main error type returned by [`crate::reports::render`]. It
/// wraps all lower-level errors and adds page-level variants. A report error
/// is terminal for the current page but does not invalidate the loaded
/// tables - the caller may render a different page without reloading.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Dataset loading error.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Derivation error.
    #[error("Derivation error: {0}")]
    Derive(#[from] DeriveError),

    /// Selection error.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// The requested page is not part of the report enumeration.
    #[error("Unknown report page: {0}")]
    UnknownPage(String),

    /// The requested dataset export name does not exist.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Report rendering error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for derivation operations.
pub type DeriveResult<T> = Result<T, DeriveError>;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // DatasetError -> ReportError
        let dataset_err = DatasetError::MissingFile("day_wise.csv".into());
        let report_err: ReportError = dataset_err.into();
        assert!(report_err.to_string().contains("day_wise.csv"));

        // QueryError -> ReportError
        let query_err = QueryError::UnknownColumn {
            table: "DaywiseGlobal",
            column: "Active",
        };
        let report_err: ReportError = query_err.into();
        assert!(report_err.to_string().contains("Active"));

        // ReportError -> ServerError
        let server_err: ServerError = ReportError::UnknownPage("nope".into()).into();
        assert!(server_err.to_string().contains("nope"));
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let err = DatasetError::MissingFile("country_wise_latest.csv".into());
        assert_eq!(err.to_string(), "File not found: country_wise_latest.csv");
    }

    #[test]
    fn test_length_mismatch_format() {
        let err = QueryError::ColumnLengthMismatch { rows: 10, values: 9 };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("9"));
    }
}
