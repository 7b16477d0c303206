//! The report pages served to the dashboard UI.
//!
//! Pages are a closed enumeration: each declares the tables it reads, the
//! parameter it accepts (if any), and the chart kind it requests from the
//! external renderer. Rendering is a pure function of
//! `(page, params, datasets)` - it may be called repeatedly and cheaply after
//! the first load, and never mutates a table.
//!
//! The actual chart drawing happens in the frontend; a report carries only
//! rows, columns, and the requested chart kind.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::logs::log_info;
use crate::derive;
use crate::error::{DeriveError, ReportResult};
use crate::models::{Dataset, Datasets};
use crate::query::{self, CategoryColumn, NumericColumn};

// =============================================================================
// Page enumeration
// =============================================================================

/// The closed set of report pages. Labels are the UI surface contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPage {
    ProjectOverview,
    NewVsTotal,
    DeathsVsRecoveries,
    FastestGrowing,
    WorstAffected,
    ActiveOverTime,
    TopRecoveryRate,
    RegionWise,
    DailyTrends,
    InteractiveMap,
    Summary,
}

/// The parameter a page accepts, drawn from distinct values of a category
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportParameter {
    /// A WHO region from the country snapshot.
    Region,
    /// A country from the time series.
    Country,
}

impl ReportParameter {
    pub fn name(&self) -> &'static str {
        match self {
            ReportParameter::Region => "region",
            ReportParameter::Country => "country",
        }
    }
}

impl ReportPage {
    /// All pages, in sidebar order.
    pub const ALL: [ReportPage; 11] = [
        ReportPage::ProjectOverview,
        ReportPage::NewVsTotal,
        ReportPage::DeathsVsRecoveries,
        ReportPage::FastestGrowing,
        ReportPage::WorstAffected,
        ReportPage::ActiveOverTime,
        ReportPage::TopRecoveryRate,
        ReportPage::RegionWise,
        ReportPage::DailyTrends,
        ReportPage::InteractiveMap,
        ReportPage::Summary,
    ];

    /// The label shown in the dashboard sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            ReportPage::ProjectOverview => "Project Overview",
            ReportPage::NewVsTotal => "New Cases vs Total Cases",
            ReportPage::DeathsVsRecoveries => "Deaths vs Recoveries",
            ReportPage::FastestGrowing => "Fastest Growing Countries",
            ReportPage::WorstAffected => "Worst Affected Countries",
            ReportPage::ActiveOverTime => "Active Cases Over Time",
            ReportPage::TopRecoveryRate => "Top Recovery Rate Countries",
            ReportPage::RegionWise => "Region-wise Analysis",
            ReportPage::DailyTrends => "Daily Trends Analysis",
            ReportPage::InteractiveMap => "Interactive Map",
            ReportPage::Summary => "Summary",
        }
    }

    /// URL-safe identifier used by the report endpoint.
    pub fn slug(&self) -> &'static str {
        match self {
            ReportPage::ProjectOverview => "project-overview",
            ReportPage::NewVsTotal => "new-vs-total",
            ReportPage::DeathsVsRecoveries => "deaths-vs-recoveries",
            ReportPage::FastestGrowing => "fastest-growing",
            ReportPage::WorstAffected => "worst-affected",
            ReportPage::ActiveOverTime => "active-over-time",
            ReportPage::TopRecoveryRate => "top-recovery-rate",
            ReportPage::RegionWise => "region-wise",
            ReportPage::DailyTrends => "daily-trends",
            ReportPage::InteractiveMap => "interactive-map",
            ReportPage::Summary => "summary",
        }
    }

    /// The tables this page reads.
    pub fn datasets(&self) -> &'static [Dataset] {
        match self {
            ReportPage::ProjectOverview => &Dataset::ALL,
            ReportPage::NewVsTotal
            | ReportPage::FastestGrowing
            | ReportPage::WorstAffected
            | ReportPage::TopRecoveryRate
            | ReportPage::RegionWise
            | ReportPage::InteractiveMap => &[Dataset::Countries],
            ReportPage::DeathsVsRecoveries | ReportPage::ActiveOverTime => &[Dataset::Daywise],
            ReportPage::DailyTrends => &[Dataset::TimeSeries],
            ReportPage::Summary => &[],
        }
    }

    /// The parameter this page accepts, if any.
    pub fn parameter(&self) -> Option<ReportParameter> {
        match self {
            ReportPage::RegionWise => Some(ReportParameter::Region),
            ReportPage::DailyTrends => Some(ReportParameter::Country),
            _ => None,
        }
    }

    /// The chart kinds this page requests, one per section.
    pub fn charts(&self) -> &'static [ChartKind] {
        match self {
            ReportPage::ProjectOverview => &[ChartKind::Table],
            ReportPage::NewVsTotal => &[ChartKind::Scatter],
            ReportPage::DeathsVsRecoveries => &[ChartKind::Pie],
            ReportPage::FastestGrowing | ReportPage::TopRecoveryRate => &[ChartKind::Bar],
            ReportPage::WorstAffected | ReportPage::RegionWise => {
                &[ChartKind::Bar, ChartKind::Bar]
            }
            ReportPage::ActiveOverTime | ReportPage::DailyTrends => &[ChartKind::Line],
            ReportPage::InteractiveMap => &[ChartKind::Choropleth],
            ReportPage::Summary => &[ChartKind::Narrative],
        }
    }

    /// Parse a page from its slug or sidebar label, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| {
            p.slug() == normalized || p.label().to_lowercase() == normalized
        })
    }
}

// =============================================================================
// Report structure
// =============================================================================

/// Chart kind requested from the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Scatter,
    Pie,
    Bar,
    Line,
    Choropleth,
    Table,
    Narrative,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Choropleth => "choropleth",
            ChartKind::Table => "table",
            ChartKind::Narrative => "narrative",
        }
    }
}

/// Parameters supplied by the UI for the parameterized pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportParams {
    pub region: Option<String>,
    pub country: Option<String>,
}

/// A rows-and-columns result ready to hand to a charting call.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportTable {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }
}

/// One chart-worth of data within a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub chart: ChartKind,
    pub table: ReportTable,
}

/// A fully rendered page.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub page: &'static str,
    pub label: &'static str,
    pub description: String,
    /// Parameters actually applied, with defaults resolved.
    pub params: ReportParams,
    /// Valid parameter values for a parameterized page, for the UI selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    pub sections: Vec<ReportSection>,
}

// =============================================================================
// Rendering
// =============================================================================

/// Render `page` against the loaded tables.
///
/// Errors are terminal for this page only; the tables stay valid and another
/// page may be rendered without reloading.
pub fn render(page: ReportPage, params: &ReportParams, datasets: &Datasets) -> ReportResult<Report> {
    log_info(format!("Rendering page: {}", page.label()));
    match page {
        ReportPage::ProjectOverview => overview(datasets),
        ReportPage::NewVsTotal => new_vs_total(datasets),
        ReportPage::DeathsVsRecoveries => deaths_vs_recoveries(datasets),
        ReportPage::FastestGrowing => fastest_growing(datasets),
        ReportPage::WorstAffected => worst_affected(datasets),
        ReportPage::ActiveOverTime => active_over_time(datasets),
        ReportPage::TopRecoveryRate => top_recovery_rate(datasets),
        ReportPage::RegionWise => region_wise(params, datasets),
        ReportPage::DailyTrends => daily_trends(params, datasets),
        ReportPage::InteractiveMap => interactive_map(datasets),
        ReportPage::Summary => summary(),
    }
}

fn report(page: ReportPage, description: impl Into<String>) -> Report {
    Report {
        page: page.slug(),
        label: page.label(),
        description: description.into(),
        params: ReportParams::default(),
        choices: None,
        sections: Vec::new(),
    }
}

fn section(title: impl Into<String>, chart: ChartKind, table: ReportTable) -> ReportSection {
    ReportSection {
        title: title.into(),
        chart,
        table,
    }
}

fn overview(datasets: &Datasets) -> ReportResult<Report> {
    let mut table = ReportTable::new(&["Dataset", "File", "Rows", "Columns"]);
    for dataset in Dataset::ALL {
        table.push(vec![
            json!(dataset.label()),
            json!(dataset.file_name()),
            json!(datasets.row_count(dataset)),
            json!(dataset.columns().join(", ")),
        ]);
    }

    let mut r = report(
        ReportPage::ProjectOverview,
        "Global COVID-19 analysis with interactivity. \
         Each dataset is available as a CSV download via the export endpoint.",
    );
    r.sections.push(section("Datasets", ChartKind::Table, table));
    Ok(r)
}

fn new_vs_total(datasets: &Datasets) -> ReportResult<Report> {
    // New Cases is the same difference as Active; the label is the contract
    let new_cases = derive::active_cases(&datasets.countries);

    let mut table = ReportTable::new(&["Country/Region", "Confirmed", "New Cases"]);
    for (record, new) in datasets.countries.iter().zip(&new_cases) {
        table.push(vec![
            json!(record.country),
            json!(record.confirmed),
            json!(new),
        ]);
    }

    let mut r = report(
        ReportPage::NewVsTotal,
        "Relationship between daily new cases and total confirmed cases globally.",
    );
    r.sections.push(section(
        "New Cases vs Total Confirmed Cases",
        ChartKind::Scatter,
        table,
    ));
    Ok(r)
}

fn deaths_vs_recoveries(datasets: &Datasets) -> ReportResult<Report> {
    let latest = query::latest(&datasets.daywise);
    let row = latest
        .first()
        .ok_or(DeriveError::EmptyTable("global totals"))?;

    let mut table = ReportTable::new(&["Outcome", "Total"]);
    table.push(vec![json!("Deaths"), json!(row.deaths)]);
    table.push(vec![json!("Recovered"), json!(row.recovered)]);

    let mut r = report(
        ReportPage::DeathsVsRecoveries,
        "Global death and recovery percentages as of the most recent date.",
    );
    r.sections.push(section(
        "Global Deaths vs Recoveries Percentage",
        ChartKind::Pie,
        table,
    ));
    Ok(r)
}

fn fastest_growing(datasets: &Datasets) -> ReportResult<Report> {
    let rates = derive::growth_rates(&datasets.countries)?;
    let top = query::top_n_by_value(&datasets.countries, &rates, 10)?;

    let mut table = ReportTable::new(&["Country/Region", "Growth Rate (%)"]);
    for (record, rate) in top {
        table.push(vec![json!(record.country), json!(rate)]);
    }

    let mut r = report(
        ReportPage::FastestGrowing,
        "Countries with the highest confirmed-case counts relative to the cross-country mean.",
    );
    r.sections.push(section(
        "Top 10 Fastest Growing Countries",
        ChartKind::Bar,
        table,
    ));
    Ok(r)
}

fn worst_affected(datasets: &Datasets) -> ReportResult<Report> {
    let top_active = query::top_n(&datasets.countries, NumericColumn::Active, 5)?;
    let top_deaths = query::top_n(&datasets.countries, NumericColumn::Deaths, 5)?;

    let mut active_table = ReportTable::new(&["Country/Region", "Active"]);
    for record in top_active {
        table_row(&mut active_table, &record.country, record.active);
    }

    let mut deaths_table = ReportTable::new(&["Country/Region", "Deaths"]);
    for record in top_deaths {
        table_row(&mut deaths_table, &record.country, record.deaths);
    }

    let mut r = report(
        ReportPage::WorstAffected,
        "Top 5 worst affected countries by active cases and deaths.",
    );
    r.sections
        .push(section("Top 5 Active Cases", ChartKind::Bar, active_table));
    r.sections
        .push(section("Top 5 Deaths", ChartKind::Bar, deaths_table));
    Ok(r)
}

fn active_over_time(datasets: &Datasets) -> ReportResult<Report> {
    let active = derive::active_cases(&datasets.daywise);

    let mut table = ReportTable::new(&["Date", "Active"]);
    for (record, active) in datasets.daywise.iter().zip(&active) {
        table.push(vec![json!(record.date), json!(active)]);
    }

    let mut r = report(
        ReportPage::ActiveOverTime,
        "Global active cases tracked over time.",
    );
    r.sections.push(section(
        "Global Active COVID-19 Cases Over Time",
        ChartKind::Line,
        table,
    ));
    Ok(r)
}

fn top_recovery_rate(datasets: &Datasets) -> ReportResult<Report> {
    let rates = derive::recovery_rates(&datasets.countries);
    let top = query::top_n_by_value(&datasets.countries, &rates, 10)?;

    let mut table = ReportTable::new(&["Country/Region", "Recovery Rate (%)"]);
    for (record, rate) in top {
        table.push(vec![json!(record.country), json!(rate)]);
    }

    let mut r = report(
        ReportPage::TopRecoveryRate,
        "Countries with the highest recovery rates globally.",
    );
    r.sections.push(section(
        "Top 10 Countries by Recovery Rate",
        ChartKind::Bar,
        table,
    ));
    Ok(r)
}

fn region_wise(params: &ReportParams, datasets: &Datasets) -> ReportResult<Report> {
    let regions = query::distinct_categories(&datasets.countries, CategoryColumn::WhoRegion)?;
    let region = match params.region.as_deref() {
        Some(r) => r.to_string(),
        // The UI's selector defaults to the first region
        None => regions.first().cloned().unwrap_or_default(),
    };

    let filtered =
        query::filter_by_category(&datasets.countries, CategoryColumn::WhoRegion, &region)?;

    let mut confirmed_table = ReportTable::new(&["Country/Region", "Confirmed"]);
    let mut deaths_table = ReportTable::new(&["Country/Region", "Deaths"]);
    for record in filtered {
        table_row(&mut confirmed_table, &record.country, record.confirmed);
        table_row(&mut deaths_table, &record.country, record.deaths);
    }

    let mut r = report(
        ReportPage::RegionWise,
        "COVID-19 metrics for the countries of one WHO region.",
    );
    r.params.region = Some(region.clone());
    r.choices = Some(regions);
    r.sections.push(section(
        format!("Confirmed Cases in {}", region),
        ChartKind::Bar,
        confirmed_table,
    ));
    r.sections.push(section(
        format!("Deaths in {}", region),
        ChartKind::Bar,
        deaths_table,
    ));
    Ok(r)
}

fn daily_trends(params: &ReportParams, datasets: &Datasets) -> ReportResult<Report> {
    let countries = query::distinct_categories(&datasets.time_series, CategoryColumn::Country)?;
    let country = match params.country.as_deref() {
        Some(c) => c.to_string(),
        None => countries.first().cloned().unwrap_or_default(),
    };

    let filtered =
        query::filter_by_category(&datasets.time_series, CategoryColumn::Country, &country)?;

    let mut table = ReportTable::new(&["Date", "Confirmed", "Deaths", "Recovered"]);
    for record in filtered {
        table.push(vec![
            json!(record.date),
            json!(record.confirmed),
            json!(record.deaths),
            json!(record.recovered),
        ]);
    }

    let mut r = report(
        ReportPage::DailyTrends,
        "Daily confirmed, death, and recovery trends for one country.",
    );
    r.params.country = Some(country.clone());
    r.choices = Some(countries);
    r.sections.push(section(
        format!("Daily COVID-19 Trends in {}", country),
        ChartKind::Line,
        table,
    ));
    Ok(r)
}

fn interactive_map(datasets: &Datasets) -> ReportResult<Report> {
    let mut table = ReportTable::new(&["Country/Region", "Confirmed"]);
    for record in &datasets.countries {
        table_row(&mut table, &record.country, record.confirmed);
    }

    let mut r = report(
        ReportPage::InteractiveMap,
        "Global COVID-19 confirmed cases on an interactive map.",
    );
    r.sections.push(section(
        "Global COVID-19 Confirmed Cases",
        ChartKind::Choropleth,
        table,
    ));
    Ok(r)
}

fn summary() -> ReportResult<Report> {
    const INSIGHTS: [(&str, &str); 7] = [
        (
            "New Cases vs Total Cases",
            "Countries with higher total confirmed cases also tend to report higher new cases, highlighting active outbreaks.",
        ),
        (
            "Deaths vs Recoveries",
            "Globally, recoveries significantly outnumber deaths, indicating medical progress.",
        ),
        (
            "Fastest Growing Countries",
            "Certain countries show exceptionally high growth rates, requiring immediate intervention.",
        ),
        (
            "Top Recovery Rate",
            "Some countries demonstrate impressive recovery percentages, reflecting healthcare resilience.",
        ),
        (
            "Region-wise Analysis",
            "Certain regions are experiencing higher confirmed cases and death rates, indicating a need for targeted interventions.",
        ),
        (
            "Daily Trends Analysis",
            "Tracking daily confirmed, death, and recovery trends gives a clear picture of ongoing COVID-19 progression.",
        ),
        (
            "Interactive Map",
            "Provides a global perspective on the spread of COVID-19, highlighting regional disparities.",
        ),
    ];

    let mut table = ReportTable::new(&["Topic", "Insight"]);
    for (topic, insight) in INSIGHTS {
        table.push(vec![json!(topic), json!(insight)]);
    }

    let mut r = report(
        ReportPage::Summary,
        "Analyzing these trends highlights the importance of global cooperation, \
         vaccination, and safety measures to manage COVID-19 effectively.",
    );
    r.sections
        .push(section("Key Insights", ChartKind::Narrative, table));
    Ok(r)
}

fn table_row(table: &mut ReportTable, country: &str, value: u64) {
    table.push(vec![json!(country), json!(value)]);
}

// =============================================================================
// Tests
// =============================================================================
