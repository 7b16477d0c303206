//! Typed records for the four COVID-19 datasets.
//!
//! Each table is a `Vec` of one of these record types, deserialized straight
//! from the raw CSV headers. Column presence is validated here, at the parse
//! boundary: a file missing a declared column fails to load, and no later
//! pipeline stage needs to re-check. Extra CSV columns are ignored.
//!
//! Row order is load order and is meaningful for the time-series tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::derive::CaseCounts;
use crate::query::{CategoryColumn, Dated, NumericColumn, TableRow};

// =============================================================================
// Country snapshot (one row per country, single point in time)
// =============================================================================

/// One country's cumulative totals from `country_wise_latest.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    #[serde(rename = "Country/Region")]
    pub country: String,
    #[serde(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    pub deaths: u64,
    #[serde(rename = "Recovered")]
    pub recovered: u64,
    #[serde(rename = "Active")]
    pub active: u64,
    #[serde(rename = "WHO Region")]
    pub who_region: String,
}

impl CaseCounts for CountryRecord {
    fn confirmed(&self) -> u64 {
        self.confirmed
    }
    fn deaths(&self) -> u64 {
        self.deaths
    }
    fn recovered(&self) -> u64 {
        self.recovered
    }
}

impl TableRow for CountryRecord {
    const TABLE: &'static str = "CountrySnapshot";

    fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Confirmed => Some(self.confirmed as f64),
            NumericColumn::Deaths => Some(self.deaths as f64),
            NumericColumn::Recovered => Some(self.recovered as f64),
            NumericColumn::Active => Some(self.active as f64),
        }
    }

    fn category(&self, column: CategoryColumn) -> Option<&str> {
        match column {
            CategoryColumn::Country => Some(&self.country),
            CategoryColumn::WhoRegion => Some(&self.who_region),
            CategoryColumn::State => None,
        }
    }
}

// =============================================================================
// Time series (one row per province/country/date)
// =============================================================================

/// One observation from `covid_19_clean_complete.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    #[serde(rename = "Province/State")]
    pub province: Option<String>,
    #[serde(rename = "Country/Region")]
    pub country: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    pub deaths: u64,
    #[serde(rename = "Recovered")]
    pub recovered: u64,
    #[serde(rename = "WHO Region")]
    pub who_region: String,
}

impl CaseCounts for TimeSeriesRecord {
    fn confirmed(&self) -> u64 {
        self.confirmed
    }
    fn deaths(&self) -> u64 {
        self.deaths
    }
    fn recovered(&self) -> u64 {
        self.recovered
    }
}

impl TableRow for TimeSeriesRecord {
    const TABLE: &'static str = "TimeSeries";

    fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Confirmed => Some(self.confirmed as f64),
            NumericColumn::Deaths => Some(self.deaths as f64),
            NumericColumn::Recovered => Some(self.recovered as f64),
            NumericColumn::Active => None,
        }
    }

    fn category(&self, column: CategoryColumn) -> Option<&str> {
        match column {
            CategoryColumn::Country => Some(&self.country),
            CategoryColumn::WhoRegion => Some(&self.who_region),
            CategoryColumn::State => None,
        }
    }
}

impl Dated for TimeSeriesRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

// =============================================================================
// Daywise global totals (one row per date)
// =============================================================================

/// Globally aggregated totals for one date from `day_wise.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaywiseRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    pub deaths: u64,
    #[serde(rename = "Recovered")]
    pub recovered: u64,
}

impl CaseCounts for DaywiseRecord {
    fn confirmed(&self) -> u64 {
        self.confirmed
    }
    fn deaths(&self) -> u64 {
        self.deaths
    }
    fn recovered(&self) -> u64 {
        self.recovered
    }
}

impl TableRow for DaywiseRecord {
    const TABLE: &'static str = "DaywiseGlobal";

    fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Confirmed => Some(self.confirmed as f64),
            NumericColumn::Deaths => Some(self.deaths as f64),
            NumericColumn::Recovered => Some(self.recovered as f64),
            NumericColumn::Active => None,
        }
    }

    fn category(&self, _column: CategoryColumn) -> Option<&str> {
        None
    }
}

impl Dated for DaywiseRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

// =============================================================================
// USA county level (one row per county/date)
// =============================================================================

/// One county observation from `usa_county_wise.csv`.
///
/// The raw file writes dates as `1/22/20` rather than ISO, hence the custom
/// serde format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyRecord {
    #[serde(rename = "Admin2")]
    pub county: Option<String>,
    #[serde(rename = "Province_State")]
    pub state: String,
    #[serde(rename = "Country_Region")]
    pub country: String,
    #[serde(rename = "Date", with = "mdy_date")]
    pub date: NaiveDate,
    #[serde(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    pub deaths: u64,
}

impl TableRow for CountyRecord {
    const TABLE: &'static str = "USACounty";

    fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Confirmed => Some(self.confirmed as f64),
            NumericColumn::Deaths => Some(self.deaths as f64),
            NumericColumn::Recovered | NumericColumn::Active => None,
        }
    }

    fn category(&self, column: CategoryColumn) -> Option<&str> {
        match column {
            CategoryColumn::Country => Some(&self.country),
            CategoryColumn::State => Some(&self.state),
            CategoryColumn::WhoRegion => None,
        }
    }
}

impl Dated for CountyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Serde format for `M/D/YY` dates as written in the USA county file.
mod mdy_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%-m/%-d/%y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, "%m/%d/%y").map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// The loaded dataset set
// =============================================================================

/// All four tables, loaded in full.
///
/// Immutable after load; derivations compute fresh value vectors instead of
/// mutating these rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub countries: Vec<CountryRecord>,
    pub time_series: Vec<TimeSeriesRecord>,
    pub daywise: Vec<DaywiseRecord>,
    pub usa_counties: Vec<CountyRecord>,
}

impl Datasets {
    /// Row count per dataset, in [`Dataset::ALL`] order.
    pub fn row_count(&self, dataset: Dataset) -> usize {
        match dataset {
            Dataset::Countries => self.countries.len(),
            Dataset::TimeSeries => self.time_series.len(),
            Dataset::Daywise => self.daywise.len(),
            Dataset::UsaCounties => self.usa_counties.len(),
        }
    }
}

// =============================================================================
// Dataset names
// =============================================================================

/// The closed set of dataset names, used for exports and page declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    Countries,
    TimeSeries,
    Daywise,
    UsaCounties,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Countries,
        Dataset::TimeSeries,
        Dataset::Daywise,
        Dataset::UsaCounties,
    ];

    /// The fixed input file name, known at build time.
    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Countries => "country_wise_latest.csv",
            Dataset::TimeSeries => "covid_19_clean_complete.csv",
            Dataset::Daywise => "day_wise.csv",
            Dataset::UsaCounties => "usa_county_wise.csv",
        }
    }

    /// Human-readable label, as shown on the Overview page.
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Countries => "Country Data",
            Dataset::TimeSeries => "Time-Series Data",
            Dataset::Daywise => "Daywise Data",
            Dataset::UsaCounties => "USA Data",
        }
    }

    /// URL-safe identifier used by the export endpoint.
    pub fn slug(&self) -> &'static str {
        match self {
            Dataset::Countries => "countries",
            Dataset::TimeSeries => "time-series",
            Dataset::Daywise => "daywise",
            Dataset::UsaCounties => "usa-counties",
        }
    }

    /// File name suggested for a downloaded export.
    pub fn export_file_name(&self) -> &'static str {
        match self {
            Dataset::Countries => "country_data.csv",
            Dataset::TimeSeries => "time_series_data.csv",
            Dataset::Daywise => "daywise_data.csv",
            Dataset::UsaCounties => "usa_data.csv",
        }
    }

    /// The typed columns carried by this dataset.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::Countries => &[
                "Country/Region",
                "Confirmed",
                "Deaths",
                "Recovered",
                "Active",
                "WHO Region",
            ],
            Dataset::TimeSeries => &[
                "Province/State",
                "Country/Region",
                "Date",
                "Confirmed",
                "Deaths",
                "Recovered",
                "WHO Region",
            ],
            Dataset::Daywise => &["Date", "Confirmed", "Deaths", "Recovered"],
            Dataset::UsaCounties => &[
                "Admin2",
                "Province_State",
                "Country_Region",
                "Date",
                "Confirmed",
                "Deaths",
            ],
        }
    }

    /// Parse an export slug, case-insensitively.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let normalized = slug.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.slug() == normalized)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_from_slug() {
        assert_eq!(Dataset::from_slug("countries"), Some(Dataset::Countries));
        assert_eq!(Dataset::from_slug("Time-Series"), Some(Dataset::TimeSeries));
        assert_eq!(Dataset::from_slug("nope"), None);
    }

    #[test]
    fn test_dataset_slug_roundtrip() {
        for dataset in Dataset::ALL {
            assert_eq!(Dataset::from_slug(dataset.slug()), Some(dataset));
        }
    }

    #[test]
    fn test_country_record_columns() {
        let record = CountryRecord {
            country: "Albania".into(),
            confirmed: 4880,
            deaths: 144,
            recovered: 2745,
            active: 1991,
            who_region: "Europe".into(),
        };
        assert_eq!(record.numeric(NumericColumn::Confirmed), Some(4880.0));
        assert_eq!(record.numeric(NumericColumn::Active), Some(1991.0));
        assert_eq!(record.category(CategoryColumn::WhoRegion), Some("Europe"));
        assert_eq!(record.category(CategoryColumn::State), None);
    }

    #[test]
    fn test_daywise_has_no_active_column() {
        let record = DaywiseRecord {
            date: NaiveDate::from_ymd_opt(2020, 7, 27).unwrap(),
            confirmed: 16480485,
            deaths: 654036,
            recovered: 9468087,
        };
        assert_eq!(record.numeric(NumericColumn::Active), None);
    }

    #[test]
    fn test_county_date_format_roundtrip() {
        let record = CountyRecord {
            county: Some("Autauga".into()),
            state: "Alabama".into(),
            country: "US".into(),
            date: NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
            confirmed: 0,
            deaths: 0,
        };

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("1/22/20"));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let parsed: CountyRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(parsed, record);
    }
}
