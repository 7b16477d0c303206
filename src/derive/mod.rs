//! Derived-column computation over the loaded tables.
//!
//! Every function here is pure: it reads a slice of rows and returns a fresh
//! value vector aligned with those rows, never mutating the table. Applying a
//! derivation twice therefore yields the same values - recomputation, not
//! accumulation.
//!
//! The [`CaseCounts`] trait is the seam: any table exposing the three
//! cumulative case-count columns gets all derivations for free.

use crate::error::{DeriveError, DeriveResult};

/// Access to the three cumulative case-count columns.
pub trait CaseCounts {
    fn confirmed(&self) -> u64;
    fn deaths(&self) -> u64;
    fn recovered(&self) -> u64;
}

/// Per-row `Confirmed - Deaths - Recovered`.
///
/// This also serves the dashboard's "New Cases" column, which is defined by
/// the same difference. Values are signed: input data violating
/// `Confirmed >= Deaths + Recovered` produces negative counts rather than an
/// error.
pub fn active_cases<R: CaseCounts>(rows: &[R]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.confirmed() as i64 - r.deaths() as i64 - r.recovered() as i64)
        .collect()
}

/// Per-row `Confirmed / mean(Confirmed) * 100`.
///
/// The mean is computed once over the full table, not a moving window. An
/// empty table has no mean and errors instead of producing NaN. A table whose
/// confirmed counts are all zero yields NaN per row, the same undefined-ratio
/// policy as [`recovery_rates`].
pub fn growth_rates<R: CaseCounts>(rows: &[R]) -> DeriveResult<Vec<f64>> {
    if rows.is_empty() {
        return Err(DeriveError::EmptyTable("growth rate"));
    }
    let mean = rows.iter().map(|r| r.confirmed() as f64).sum::<f64>() / rows.len() as f64;
    Ok(rows
        .iter()
        .map(|r| r.confirmed() as f64 / mean * 100.0)
        .collect())
}

/// Per-row `Recovered / Confirmed * 100`.
///
/// Rows with `Confirmed = 0` produce NaN and are kept, not dropped; top-N
/// selection ranks NaN below every finite rate. Dropping such rows would
/// silently change the population the recovery-rate ranking runs over.
pub fn recovery_rates<R: CaseCounts>(rows: &[R]) -> Vec<f64> {
    rows.iter()
        .map(|r| r.recovered() as f64 / r.confirmed() as f64 * 100.0)
        .collect()
}
