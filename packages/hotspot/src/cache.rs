//! Process-wide dataset memo and latest-request-wins run sequencing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use hotspot_map_source::progress::ProgressCallback;
use hotspot_map_source::{LoadedDataset, SourceError, load_accidents};

static GLOBAL_CACHE: LazyLock<DatasetCache> = LazyLock::new(DatasetCache::new);

/// Loaded datasets keyed by canonical source path.
///
/// A dataset is read from disk at most once per path; later callers share
/// the same [`Arc`]. Loads hold the lock, so concurrent first requests for
/// one file do not parse it twice.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<BTreeMap<PathBuf, Arc<LoadedDataset>>>,
}

impl DatasetCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_CACHE
    }

    /// Returns the dataset at `path`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the path cannot be resolved or the load
    /// fails. Failures are not cached.
    pub fn get_or_load(
        &self,
        path: &Path,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Arc<LoadedDataset>, SourceError> {
        let key = std::fs::canonicalize(path)?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(dataset) = entries.get(&key) {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_accidents(&key, progress)?);
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drops the cached entry for `path` so the next request reloads it.
    /// Returns `true` if an entry was removed.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
    }

    /// Number of cached datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hands out increasing run tickets so that only the most recent request's
/// result is published.
#[derive(Debug, Default)]
pub struct RunSequencer {
    latest: AtomicU64,
}

/// Identifies one run started through a [`RunSequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunTicket(u64);

impl RunSequencer {
    /// Creates a sequencer with no runs started.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run, superseding every earlier ticket.
    pub fn begin(&self) -> RunTicket {
        RunTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns `true` if no run has started since `ticket`.
    #[must_use]
    pub fn is_current(&self, ticket: RunTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Returns `result` if `ticket` is still current, otherwise discards it.
    pub fn publish<T>(&self, ticket: RunTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            log::debug!("Discarding stale result for run {}", ticket.0);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use hotspot_map_source::progress::null_progress;

    use super::*;

    fn write_temp(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hotspot_map_cache_{}_{name}",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "Start_Lat,Start_Lng,Start_Time,Severity,Street\n\
             25.77,-80.19,2016-02-08 05:46:00,2,I-95 N\n\
             25.78,-80.20,2016-02-08 17:46:00,3,SW 8th St\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn loads_once_per_path() {
        let path = write_temp("once.csv");
        let cache = DatasetCache::new();

        let first = cache.get_or_load(&path, &null_progress()).unwrap();
        let second = cache.get_or_load(&path, &null_progress()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.records.len(), 2);

        assert!(cache.invalidate(&path));
        assert!(cache.is_empty());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn equivalent_paths_share_an_entry() {
        let path = write_temp("alias.csv");
        let dir = path.parent().unwrap();
        let alias = dir.join(".").join(path.file_name().unwrap());
        let cache = DatasetCache::new();

        let first = cache.get_or_load(&path, &null_progress()).unwrap();
        let second = cache.get_or_load(&alias, &null_progress()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let cache = DatasetCache::new();
        let missing = std::env::temp_dir().join("hotspot_map_cache_missing.csv");
        assert!(cache.get_or_load(&missing, &null_progress()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn latest_ticket_wins() {
        let sequencer = RunSequencer::new();
        let first = sequencer.begin();
        let second = sequencer.begin();

        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert_eq!(sequencer.publish(first, "stale"), None);
        assert_eq!(sequencer.publish(second, "fresh"), Some("fresh"));
        assert!(first < second);
    }
}
