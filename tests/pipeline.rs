//! End-to-end pipeline tests: fixture files on disk, loaded through the
//! cache, rendered page by page, exported and reloaded.

use std::fs;
use std::sync::Arc;

use covidash::{
    export_csv, load_datasets, render, Dataset, DatasetCache, DatasetError, ReportPage,
    ReportParams,
};
use tempfile::{tempdir, TempDir};

const COUNTRY_CSV: &str = "\
Country/Region,Confirmed,Deaths,Recovered,Active,New cases,WHO Region
Afghanistan,36263,1269,25198,9796,106,Eastern Mediterranean
Albania,4880,144,2745,1991,117,Europe
Italy,246286,35112,198593,12581,254,Europe
Spain,272421,28432,150376,93613,0,Europe
US,4290259,148011,1325804,2816444,56336,Americas
Brazil,2442375,87618,1846641,508116,23284,Americas
";

const TIME_SERIES_CSV: &str = "\
Province/State,Country/Region,Lat,Long,Date,Confirmed,Deaths,Recovered,Active,WHO Region
,Italy,41.87194,12.56738,2020-07-25,245864,35102,197842,12920,Europe
,Italy,41.87194,12.56738,2020-07-26,246118,35107,198192,12819,Europe
,Italy,41.87194,12.56738,2020-07-27,246286,35112,198593,12581,Europe
,Albania,41.1533,20.1683,2020-07-25,4637,134,2637,1866,Europe
,Albania,41.1533,20.1683,2020-07-26,4763,138,2682,1943,Europe
,Albania,41.1533,20.1683,2020-07-27,4880,144,2745,1991,Europe
";

const DAYWISE_CSV: &str = "\
Date,Confirmed,Deaths,Recovered,Active
2020-07-25,15930779,641559,9311442,5977778
2020-07-26,16180188,646403,9403966,6129819
2020-07-27,16480485,654036,9468087,6358362
";

const USA_CSV: &str = "\
UID,iso2,iso3,Admin2,Province_State,Country_Region,Date,Confirmed,Deaths
84001001,US,USA,Autauga,Alabama,US,7/26/20,915,21
84001001,US,USA,Autauga,Alabama,US,7/27/20,935,22
84001003,US,USA,Baldwin,Alabama,US,7/26/20,1584,11
84001003,US,USA,Baldwin,Alabama,US,7/27/20,1643,11
";

fn fixture_dir() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("country_wise_latest.csv"), COUNTRY_CSV).unwrap();
    fs::write(
        dir.path().join("covid_19_clean_complete.csv"),
        TIME_SERIES_CSV,
    )
    .unwrap();
    fs::write(dir.path().join("day_wise.csv"), DAYWISE_CSV).unwrap();
    fs::write(dir.path().join("usa_county_wise.csv"), USA_CSV).unwrap();
    dir
}

#[test]
fn loads_four_nonempty_tables() {
    let dir = fixture_dir();
    let datasets = load_datasets(dir.path()).unwrap();

    assert_eq!(datasets.countries.len(), 6);
    assert_eq!(datasets.time_series.len(), 6);
    assert_eq!(datasets.daywise.len(), 3);
    assert_eq!(datasets.usa_counties.len(), 4);
}

#[test]
fn missing_file_fails_and_returns_no_tables() {
    for name in [
        "country_wise_latest.csv",
        "covid_19_clean_complete.csv",
        "day_wise.csv",
        "usa_county_wise.csv",
    ] {
        let dir = fixture_dir();
        fs::remove_file(dir.path().join(name)).unwrap();

        let err = load_datasets(dir.path()).unwrap_err();
        assert!(
            matches!(err, DatasetError::MissingFile(ref f) if f == name),
            "expected MissingFile for {}, got {}",
            name,
            err
        );
    }
}

#[test]
fn every_page_renders_through_the_cache() {
    let dir = fixture_dir();
    let cache = Arc::new(DatasetCache::new(dir.path()));
    let datasets = cache.get().unwrap();

    for page in ReportPage::ALL {
        let report = render(page, &ReportParams::default(), &datasets).unwrap();
        assert_eq!(report.page, page.slug());
        assert_eq!(
            report.sections.len(),
            page.charts().len(),
            "{} section count",
            page.label()
        );
        for (section, chart) in report.sections.iter().zip(page.charts()) {
            assert_eq!(section.chart, *chart, "{} chart kind", page.label());
        }
    }
}

#[test]
fn region_filter_count_matches_raw_file() {
    let dir = fixture_dir();
    let datasets = load_datasets(dir.path()).unwrap();

    let europe_in_raw = COUNTRY_CSV
        .lines()
        .skip(1)
        .filter(|l| l.ends_with(",Europe"))
        .count();

    let params = ReportParams {
        region: Some("Europe".into()),
        country: None,
    };
    let report = render(ReportPage::RegionWise, &params, &datasets).unwrap();
    assert_eq!(report.sections[0].table.rows.len(), europe_in_raw);
}

#[test]
fn worst_affected_is_strictly_non_increasing() {
    let dir = fixture_dir();
    let datasets = load_datasets(dir.path()).unwrap();

    let report = render(ReportPage::WorstAffected, &ReportParams::default(), &datasets).unwrap();
    let deaths: Vec<u64> = report.sections[1]
        .table
        .rows
        .iter()
        .map(|row| row[1].as_u64().unwrap())
        .collect();

    assert_eq!(deaths.len(), 5);
    for pair in deaths.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[test]
fn export_reload_roundtrip_preserves_tables() {
    let dir = fixture_dir();
    let datasets = load_datasets(dir.path()).unwrap();

    let redir = tempdir().unwrap();
    for dataset in Dataset::ALL {
        let exported = export_csv(&datasets, dataset).unwrap();
        fs::write(redir.path().join(dataset.file_name()), exported).unwrap();
    }

    let reloaded = load_datasets(redir.path()).unwrap();
    assert_eq!(reloaded, datasets);
}

#[test]
fn cache_clear_forces_refail() {
    let dir = fixture_dir();
    let cache = DatasetCache::new(dir.path());
    cache.get().unwrap();

    // A memoized load survives file deletion until invalidated
    fs::remove_file(dir.path().join("usa_county_wise.csv")).unwrap();
    assert!(cache.get().is_ok());

    cache.invalidate();
    let err = cache.get().unwrap_err();
    assert!(matches!(err, DatasetError::MissingFile(ref f) if f == "usa_county_wise.csv"));
}

#[test]
fn deaths_vs_recoveries_uses_most_recent_date() {
    let dir = fixture_dir();
    let datasets = load_datasets(dir.path()).unwrap();

    let report = render(
        ReportPage::DeathsVsRecoveries,
        &ReportParams::default(),
        &datasets,
    )
    .unwrap();
    let table = &report.sections[0].table;
    // Totals from the 2020-07-27 row of day_wise.csv
    assert_eq!(table.rows[0][1].as_u64(), Some(654036));
    assert_eq!(table.rows[1][1].as_u64(), Some(9468087));
}
