//! Stateless selection and aggregation over loaded tables.
//!
//! Every operation here is read-only: functions borrow rows and return
//! references in a new order or subset, never mutating the input. Ordering is
//! always explicit - nothing below trusts load order except as a tie-breaker.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{QueryError, QueryResult};

// =============================================================================
// Column access
// =============================================================================

/// Numeric columns a table may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl NumericColumn {
    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::Confirmed => "Confirmed",
            NumericColumn::Deaths => "Deaths",
            NumericColumn::Recovered => "Recovered",
            NumericColumn::Active => "Active",
        }
    }
}

/// Categorical columns a table may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    Country,
    WhoRegion,
    State,
}

impl CategoryColumn {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryColumn::Country => "Country/Region",
            CategoryColumn::WhoRegion => "WHO Region",
            CategoryColumn::State => "Province_State",
        }
    }
}

/// Column access for a table row.
///
/// Whether a column is available depends only on the row type, never on the
/// row's values, so `None` always means "this table has no such column".
pub trait TableRow {
    /// Table name used in error messages.
    const TABLE: &'static str;

    fn numeric(&self, column: NumericColumn) -> Option<f64>;
    fn category(&self, column: CategoryColumn) -> Option<&str>;
}

/// Rows carrying a date column.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

// =============================================================================
// Selection operations
// =============================================================================

/// The `n` rows with the largest value of `column`, descending.
///
/// The sort is stable: ties keep original row order. If `n` exceeds the row
/// count, all rows are returned. Referencing a column the table does not
/// carry is an [`QueryError::UnknownColumn`] error.
pub fn top_n<'a, R: TableRow>(
    rows: &'a [R],
    column: NumericColumn,
    n: usize,
) -> QueryResult<Vec<&'a R>> {
    if let Some(first) = rows.first() {
        if first.numeric(column).is_none() {
            return Err(QueryError::UnknownColumn {
                table: R::TABLE,
                column: column.name(),
            });
        }
    }

    let mut selected: Vec<&R> = rows.iter().collect();
    selected.sort_by(|a, b| {
        compare_descending(
            a.numeric(column).unwrap_or(f64::NAN),
            b.numeric(column).unwrap_or(f64::NAN),
        )
    });
    selected.truncate(n);
    Ok(selected)
}

/// Top-N keyed by an already-derived value vector aligned with `rows`.
///
/// Same ordering contract as [`top_n`]; NaN values rank below every finite
/// value. A misaligned vector is a loud programming error.
pub fn top_n_by_value<'a, R>(
    rows: &'a [R],
    values: &[f64],
    n: usize,
) -> QueryResult<Vec<(&'a R, f64)>> {
    if rows.len() != values.len() {
        return Err(QueryError::ColumnLengthMismatch {
            rows: rows.len(),
            values: values.len(),
        });
    }

    let mut paired: Vec<(&R, f64)> = rows.iter().zip(values.iter().copied()).collect();
    paired.sort_by(|a, b| compare_descending(a.1, b.1));
    paired.truncate(n);
    Ok(paired)
}

/// All rows where the categorical `column` equals `value`, original order
/// preserved. No match is an empty result, not an error.
pub fn filter_by_category<'a, R: TableRow>(
    rows: &'a [R],
    column: CategoryColumn,
    value: &str,
) -> QueryResult<Vec<&'a R>> {
    if let Some(first) = rows.first() {
        if first.category(column).is_none() {
            return Err(QueryError::UnknownColumn {
                table: R::TABLE,
                column: column.name(),
            });
        }
    }

    Ok(rows
        .iter()
        .filter(|r| r.category(column) == Some(value))
        .collect())
}

/// The row(s) carrying the maximum date.
///
/// Selected by an explicit max-date scan so the result never depends on load
/// order. Empty input yields an empty result.
pub fn latest<R: Dated>(rows: &[R]) -> Vec<&R> {
    let Some(max) = rows.iter().map(|r| r.date()).max() else {
        return Vec::new();
    };
    rows.iter().filter(|r| r.date() == max).collect()
}

/// Distinct values of a categorical column, in first-seen order.
///
/// Feeds the region/country selectors of the parameterized pages.
pub fn distinct_categories<R: TableRow>(
    rows: &[R],
    column: CategoryColumn,
) -> QueryResult<Vec<String>> {
    if let Some(first) = rows.first() {
        if first.category(column).is_none() {
            return Err(QueryError::UnknownColumn {
                table: R::TABLE,
                column: column.name(),
            });
        }
    }

    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for row in rows {
        if let Some(value) = row.category(column) {
            if seen.insert(value.to_string()) {
                distinct.push(value.to_string());
            }
        }
    }
    Ok(distinct)
}

/// Descending comparison with NaN ordered after every finite value.
fn compare_descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountryRecord, DaywiseRecord};

    fn country(name: &str, confirmed: u64, deaths: u64, region: &str) -> CountryRecord {
        CountryRecord {
            country: name.into(),
            confirmed,
            deaths,
            recovered: 0,
            active: 0,
            who_region: region.into(),
        }
    }

    fn snapshot() -> Vec<CountryRecord> {
        vec![
            country("Brazil", 2442375, 87618, "Americas"),
            country("US", 4290259, 148011, "Americas"),
            country("Italy", 246286, 35112, "Europe"),
            country("Spain", 272421, 28432, "Europe"),
            country("France", 220352, 30212, "Europe"),
        ]
    }

    #[test]
    fn test_top_n_descending() {
        let rows = snapshot();
        let top = top_n(&rows, NumericColumn::Deaths, 3).unwrap();
        let deaths: Vec<u64> = top.iter().map(|r| r.deaths).collect();
        assert_eq!(deaths, vec![148011, 87618, 35112]);
        for pair in deaths.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_top_n_clamps_to_row_count() {
        let rows = snapshot();
        let top = top_n(&rows, NumericColumn::Confirmed, 50).unwrap();
        assert_eq!(top.len(), rows.len());
    }

    #[test]
    fn test_top_n_stable_on_ties() {
        let rows = vec![
            country("First", 100, 10, "Europe"),
            country("Second", 100, 10, "Europe"),
            country("Third", 200, 10, "Europe"),
        ];
        let top = top_n(&rows, NumericColumn::Confirmed, 3).unwrap();
        assert_eq!(top[0].country, "Third");
        assert_eq!(top[1].country, "First");
        assert_eq!(top[2].country, "Second");
    }

    #[test]
    fn test_top_n_unknown_column() {
        let rows = vec![DaywiseRecord {
            date: chrono::NaiveDate::from_ymd_opt(2020, 7, 27).unwrap(),
            confirmed: 1,
            deaths: 0,
            recovered: 0,
        }];
        let err = top_n(&rows, NumericColumn::Active, 1).unwrap_err();
        assert!(err.to_string().contains("Active"));
        assert!(err.to_string().contains("DaywiseGlobal"));
    }

    #[test]
    fn test_top_n_by_value_ranks_nan_last() {
        let rows = snapshot();
        let values = vec![50.0, f64::NAN, 80.0, 10.0, f64::NAN];
        let top = top_n_by_value(&rows, &values, 5).unwrap();
        assert_eq!(top[0].0.country, "Italy");
        assert_eq!(top[1].0.country, "Brazil");
        assert_eq!(top[2].0.country, "Spain");
        assert!(top[3].1.is_nan());
        assert!(top[4].1.is_nan());
    }

    #[test]
    fn test_top_n_by_value_length_mismatch() {
        let rows = snapshot();
        let values = vec![1.0, 2.0];
        assert!(top_n_by_value(&rows, &values, 2).is_err());
    }

    #[test]
    fn test_filter_by_category() {
        let rows = snapshot();
        let europe = filter_by_category(&rows, CategoryColumn::WhoRegion, "Europe").unwrap();
        assert_eq!(europe.len(), 3);
        assert!(europe.iter().all(|r| r.who_region == "Europe"));
        // Original order preserved
        assert_eq!(europe[0].country, "Italy");
    }

    #[test]
    fn test_filter_by_category_no_match_is_empty() {
        let rows = snapshot();
        let none = filter_by_category(&rows, CategoryColumn::WhoRegion, "Atlantis").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_latest_ignores_load_order() {
        let day = |d: u32, confirmed: u64| DaywiseRecord {
            date: chrono::NaiveDate::from_ymd_opt(2020, 7, d).unwrap(),
            confirmed,
            deaths: 0,
            recovered: 0,
        };
        // Deliberately shuffled
        let rows = vec![day(26, 200), day(27, 300), day(25, 100)];
        let last = latest(&rows);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].confirmed, 300);
    }

    #[test]
    fn test_latest_empty() {
        let rows: Vec<DaywiseRecord> = Vec::new();
        assert!(latest(&rows).is_empty());
    }

    #[test]
    fn test_distinct_categories_first_seen_order() {
        let rows = snapshot();
        let regions = distinct_categories(&rows, CategoryColumn::WhoRegion).unwrap();
        assert_eq!(regions, vec!["Americas".to_string(), "Europe".to_string()]);
    }
}
