//! Memoized dataset loading with explicit invalidation.
//!
//! The cache is an explicit object owned by the composition root and handed
//! to whoever needs the tables - there is no process-wide global. The first
//! `get` loads the four files; later calls share the same `Arc` until
//! `invalidate` clears the memo, after which the next `get` reloads and
//! re-fails or re-succeeds on its own.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::api::logs::log_info;
use crate::error::DatasetResult;
use crate::loader::load_datasets;
use crate::models::Datasets;

/// Caching loader for the four datasets.
pub struct DatasetCache {
    data_dir: PathBuf,
    loaded: Mutex<Option<Arc<Datasets>>>,
}

impl DatasetCache {
    /// Create a cache over `data_dir`. Nothing is read until [`get`](Self::get).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            loaded: Mutex::new(None),
        }
    }

    /// The directory the datasets are read from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The datasets, loading them on first access.
    ///
    /// A failed load leaves the cache empty, so the next call retries from
    /// scratch. No partial data is ever stored.
    pub fn get(&self) -> DatasetResult<Arc<Datasets>> {
        let mut guard = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(datasets) = guard.as_ref() {
            return Ok(Arc::clone(datasets));
        }

        let datasets = Arc::new(load_datasets(&self.data_dir)?);
        *guard = Some(Arc::clone(&datasets));
        Ok(datasets)
    }

    /// Atomically clear the memo. The next [`get`](Self::get) reloads.
    ///
    /// There is no partial invalidation of a subset of the four tables.
    pub fn invalidate(&self) {
        let mut guard = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        log_info("Dataset cache cleared");
    }

    /// Whether a load result is currently memoized.
    pub fn is_loaded(&self) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("country_wise_latest.csv"),
            "Country/Region,Confirmed,Deaths,Recovered,Active,WHO Region\n\
             Albania,4880,144,2745,1991,Europe\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("covid_19_clean_complete.csv"),
            "Province/State,Country/Region,Date,Confirmed,Deaths,Recovered,WHO Region\n\
             ,Albania,2020-01-22,0,0,0,Europe\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("day_wise.csv"),
            "Date,Confirmed,Deaths,Recovered\n2020-01-22,555,17,28\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("usa_county_wise.csv"),
            "Admin2,Province_State,Country_Region,Date,Confirmed,Deaths\n\
             Autauga,Alabama,US,1/22/20,0,0\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_get_memoizes() {
        let dir = write_fixture_dir();
        let cache = DatasetCache::new(dir.path());
        assert!(!cache.is_loaded());

        let first = cache.get().unwrap();
        assert!(cache.is_loaded());

        // Deleting the files does not disturb the memoized load
        fs::remove_file(dir.path().join("day_wise.csv")).unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = write_fixture_dir();
        let cache = DatasetCache::new(dir.path());
        cache.get().unwrap();

        fs::remove_file(dir.path().join("day_wise.csv")).unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());

        let err = cache.get().unwrap_err();
        assert!(matches!(err, DatasetError::MissingFile(ref f) if f == "day_wise.csv"));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        assert!(cache.get().is_err());
        assert!(!cache.is_loaded());

        // Populating the directory makes the next get succeed
        let fixture = write_fixture_dir();
        for name in [
            "country_wise_latest.csv",
            "covid_19_clean_complete.csv",
            "day_wise.csv",
            "usa_county_wise.csv",
        ] {
            fs::copy(fixture.path().join(name), dir.path().join(name)).unwrap();
        }
        assert!(cache.get().is_ok());
    }
}
