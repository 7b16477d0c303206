//! Dataset loading and export.
//!
//! The loader reads the four fixed CSV files from a data directory into the
//! typed tables of [`crate::models`]. Loading is all-or-nothing: a missing
//! file, an undecodable byte stream, or a malformed table aborts the whole
//! load and the caller must not proceed with partial data.
//!
//! Encoding is auto-detected per file before CSV parsing, so a snapshot
//! exported from a spreadsheet as Windows-1252 still loads.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::logs::{log_info, log_success};
use crate::error::{DatasetError, DatasetResult};
use crate::models::{Dataset, Datasets};

/// Load all four tables from `dir`.
///
/// Files are the fixed names of [`Dataset::file_name`]. Fails fast on the
/// first missing or malformed file.
pub fn load_datasets(dir: &Path) -> DatasetResult<Datasets> {
    log_info(format!("Loading datasets from {}", dir.display()));

    let countries = load_table(dir, Dataset::Countries)?;
    let time_series = load_table(dir, Dataset::TimeSeries)?;
    let daywise = load_table(dir, Dataset::Daywise)?;
    let usa_counties = load_table(dir, Dataset::UsaCounties)?;

    let datasets = Datasets {
        countries,
        time_series,
        daywise,
        usa_counties,
    };
    log_success(format!(
        "Loaded {} countries, {} time-series rows, {} daywise rows, {} county rows",
        datasets.countries.len(),
        datasets.time_series.len(),
        datasets.daywise.len(),
        datasets.usa_counties.len(),
    ));
    Ok(datasets)
}

/// Load a single table from `dir`.
fn load_table<T: DeserializeOwned>(dir: &Path, dataset: Dataset) -> DatasetResult<Vec<T>> {
    let file = dataset.file_name();
    let path = dir.join(file);
    if !path.exists() {
        return Err(DatasetError::MissingFile(file.to_string()));
    }

    let bytes = fs::read(&path).map_err(|e| DatasetError::Io {
        file: file.to_string(),
        source: e,
    })?;
    let content = decode(&bytes, file)?;
    let rows = parse_table(&content, file)?;
    log_success(format!("{}: {} rows", file, rows.len()));
    Ok(rows)
}

/// Detect the encoding of raw bytes, normalized to a canonical name.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _confidence, _language) = chardet::detect(bytes);
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode file bytes using the detected encoding.
///
/// Unrecognized encodings are refused rather than decoded lossily - a
/// mangled country name would silently break every category filter on it.
fn decode(bytes: &[u8], file: &str) -> DatasetResult<String> {
    let encoding = detect_encoding(bytes);
    match encoding.as_str() {
        "utf-8" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "windows-1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        other => Err(DatasetError::Encoding {
            file: file.to_string(),
            encoding: other.to_string(),
        }),
    }
}

/// Parse decoded CSV text into typed records.
///
/// Column presence is enforced here by serde: a file missing a declared
/// column fails with a parse error naming the file.
fn parse_table<T: DeserializeOwned>(content: &str, file: &str) -> DatasetResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|e| DatasetError::Parse {
            file: file.to_string(),
            source: e,
        })?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(DatasetError::EmptyFile(file.to_string()));
    }
    Ok(rows)
}

// =============================================================================
// Export
// =============================================================================

/// Serialize a loaded table back to CSV text for the Overview downloads.
///
/// Reloading an export yields a table equal to the in-memory original.
pub fn export_csv(datasets: &Datasets, dataset: Dataset) -> DatasetResult<String> {
    match dataset {
        Dataset::Countries => write_table(&datasets.countries, dataset),
        Dataset::TimeSeries => write_table(&datasets.time_series, dataset),
        Dataset::Daywise => write_table(&datasets.daywise, dataset),
        Dataset::UsaCounties => write_table(&datasets.usa_counties, dataset),
    }
}

fn write_table<T: Serialize>(rows: &[T], dataset: Dataset) -> DatasetResult<String> {
    let file = dataset.file_name();
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| DatasetError::Parse {
            file: file.to_string(),
            source: e,
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| DatasetError::Io {
        file: file.to_string(),
        source: std::io::Error::other(e.to_string()),
    })?;
    String::from_utf8(bytes).map_err(|_| DatasetError::Encoding {
        file: file.to_string(),
        encoding: "utf-8".to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
