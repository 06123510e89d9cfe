// Machine catalog: the cached list of every machine on the platform.
//
// The catalog lives in the config store under `machines`. It is fetched
// once and then served from the cache until the caller asks for a refresh
// (or somebody removes the key). Every field is lowercased before caching,
// which makes name lookups case-insensitive for callers that lowercase
// their query too.

use crate::error::{Error, Result};
use crate::store::{ConfigStore, API_KEY, MACHINES};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One row of the remote listing, in the order the server sends it:
/// creation date, creation time, name, status or level, url.
///
/// No schema is enforced: a row holds exactly the fields the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineRecord(pub Vec<String>);

impl MachineRecord {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        MachineRecord(fields.into_iter().map(Into::into).collect())
    }

    /// Split one line of the listing on whitespace.
    pub fn from_line(line: &str) -> Self {
        MachineRecord::new(line.split_whitespace())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    fn field(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.field(0)
    }

    pub fn creation_time(&self) -> Option<&str> {
        self.field(1)
    }

    pub fn name(&self) -> Option<&str> {
        self.field(2)
    }

    /// Level (`easy`, `medium`, `hard`) or the user's status on it.
    pub fn status(&self) -> Option<&str> {
        self.field(3)
    }

    pub fn url(&self) -> Option<&str> {
        self.field(4)
    }

    fn to_lowercase(&self) -> Self {
        MachineRecord(self.0.iter().map(|f| f.to_lowercase()).collect())
    }
}

/// Anything that can produce a fresh copy of the catalog.
pub trait CatalogSource {
    fn fetch_catalog(&self, api_key: Option<&str>) -> Result<Vec<MachineRecord>>;
}

/// Cache in front of a `CatalogSource`, backed by the config store.
pub struct Catalog<'a, S: CatalogSource + ?Sized> {
    store: &'a mut ConfigStore,
    source: &'a S,
}

impl<'a, S: CatalogSource + ?Sized> Catalog<'a, S> {
    pub fn new(store: &'a mut ConfigStore, source: &'a S) -> Self {
        Catalog { store, source }
    }

    /// Return the catalog, from cache unless `force_refresh` is set or
    /// nothing usable is cached.
    pub fn list(&mut self, force_refresh: bool) -> Result<Vec<MachineRecord>> {
        if !force_refresh {
            if let Some(cached) = self.cached() {
                debug!(rows = cached.len(), "catalog served from cache");
                return Ok(cached);
            }
        }

        debug!(force_refresh, "fetching catalog");
        let api_key = self.store.get_str(API_KEY).map(str::to_owned);
        let rows: Vec<MachineRecord> = self
            .source
            .fetch_catalog(api_key.as_deref())?
            .iter()
            .map(MachineRecord::to_lowercase)
            .collect();
        self.store.set(MACHINES, serde_json::to_value(&rows)?)?;
        Ok(rows)
    }

    fn cached(&self) -> Option<Vec<MachineRecord>> {
        let value = self.store.get(MACHINES)?;
        match serde_json::from_value(value.clone()) {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(error = %e, "ignoring malformed cached catalog");
                None
            }
        }
    }

    /// Fail with `MachineNotFound` unless `name` matches the name field of
    /// some catalog row. The query is lowercased to match the cache.
    pub fn ensure_exists(&mut self, name: &str) -> Result<MachineRecord> {
        let wanted = name.to_lowercase();
        self.list(false)?
            .into_iter()
            .find(|row| row.name() == Some(wanted.as_str()))
            .ok_or_else(|| Error::MachineNotFound(name.to_string()))
    }
}

/// Level filter accepted by `list --level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

impl LevelFilter {
    /// Unknown levels fall back to `All`.
    pub fn parse(level: &str) -> Self {
        match level.to_lowercase().as_str() {
            "easy" => LevelFilter::Easy,
            "medium" => LevelFilter::Medium,
            "hard" => LevelFilter::Hard,
            _ => LevelFilter::All,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LevelFilter::All => "all",
            LevelFilter::Easy => "easy",
            LevelFilter::Medium => "medium",
            LevelFilter::Hard => "hard",
        }
    }
}

/// Row selection applied on top of `Catalog::list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub level: LevelFilter,
    pub pending: bool,
    pub finished: bool,
    /// 0 means no limit.
    pub limit: usize,
    pub descending: bool,
}

impl ListFilter {
    pub fn apply<'r>(&self, rows: &'r [MachineRecord]) -> Vec<&'r MachineRecord> {
        let ordered: Box<dyn Iterator<Item = &'r MachineRecord>> = if self.descending {
            Box::new(rows.iter().rev())
        } else {
            Box::new(rows.iter())
        };

        let selected = ordered.filter(|row| self.matches(row));
        if self.limit == 0 {
            selected.collect()
        } else {
            selected.take(self.limit).collect()
        }
    }

    fn matches(&self, row: &MachineRecord) -> bool {
        let status = row.status().unwrap_or_default().to_lowercase();
        if self.pending || self.finished {
            // status filters replace the level filter
            return (self.pending && status == "pending") || (self.finished && status == "finished");
        }
        self.level == LevelFilter::All || status == self.level.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    struct FakeSource {
        rows: RefCell<Vec<MachineRecord>>,
        calls: Cell<usize>,
        seen_key: RefCell<Option<String>>,
    }

    impl FakeSource {
        fn new(rows: Vec<MachineRecord>) -> Self {
            FakeSource {
                rows: RefCell::new(rows),
                calls: Cell::new(0),
                seen_key: RefCell::new(None),
            }
        }
    }

    impl CatalogSource for FakeSource {
        fn fetch_catalog(&self, api_key: Option<&str>) -> Result<Vec<MachineRecord>> {
            let key = api_key.ok_or(Error::ApiKeyMissing)?;
            self.calls.set(self.calls.get() + 1);
            *self.seen_key.borrow_mut() = Some(key.to_string());
            Ok(self.rows.borrow().clone())
        }
    }

    fn row(fields: [&str; 5]) -> MachineRecord {
        MachineRecord::new(fields)
    }

    fn store_with_key(dir: &TempDir) -> ConfigStore {
        let mut store = ConfigStore::open(dir.path().join("config.json")).unwrap();
        store.set(API_KEY, "ABC123").unwrap();
        store
    }

    #[test]
    fn record_from_line_splits_on_whitespace() {
        let rec = MachineRecord::from_line("2022-01-01  10:00\tAlpha easy  https://x/alpha");
        assert_eq!(rec.creation_date(), Some("2022-01-01"));
        assert_eq!(rec.creation_time(), Some("10:00"));
        assert_eq!(rec.name(), Some("Alpha"));
        assert_eq!(rec.status(), Some("easy"));
        assert_eq!(rec.url(), Some("https://x/alpha"));
    }

    #[test]
    fn short_record_keeps_what_it_has() {
        let rec = MachineRecord::from_line("2022-01-01 10:00 alpha");
        assert_eq!(rec.fields().len(), 3);
        assert_eq!(rec.status(), None);
    }

    #[test]
    fn cache_hit_does_not_fetch_again() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        let source = FakeSource::new(vec![row(["2022-01-01", "10:00", "Alpha", "Easy", "U1"])]);
        let mut catalog = Catalog::new(&mut store, &source);

        let first = catalog.list(false).unwrap();
        source.rows.borrow_mut().clear();
        let second = catalog.list(false).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(source.seen_key.borrow().as_deref(), Some("ABC123"));
    }

    #[test]
    fn fetched_rows_are_lowercased_and_persisted() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        let source = FakeSource::new(vec![row(["2022-01-01", "10:00", "BOX01", "Hard", "URL"])]);
        Catalog::new(&mut store, &source).list(false).unwrap();

        let reloaded = ConfigStore::open(store.path()).unwrap();
        let cached: Vec<MachineRecord> =
            serde_json::from_value(reloaded.get(MACHINES).unwrap().clone()).unwrap();
        assert_eq!(cached, vec![row(["2022-01-01", "10:00", "box01", "hard", "url"])]);
    }

    #[test]
    fn force_refresh_overwrites_cache() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        let source = FakeSource::new(vec![row(["d", "t", "alpha", "easy", "u"])]);
        let mut catalog = Catalog::new(&mut store, &source);
        catalog.list(false).unwrap();

        *source.rows.borrow_mut() = vec![row(["d", "t", "bravo", "medium", "u"])];
        let refreshed = catalog.list(true).unwrap();

        assert_eq!(source.calls.get(), 2);
        assert_eq!(refreshed[0].name(), Some("bravo"));
        assert_eq!(catalog.list(false).unwrap(), refreshed);
    }

    #[test]
    fn removing_cache_key_triggers_refetch() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        let source = FakeSource::new(vec![row(["d", "t", "alpha", "easy", "u"])]);
        Catalog::new(&mut store, &source).list(false).unwrap();
        store.remove(MACHINES).unwrap();
        Catalog::new(&mut store, &source).list(false).unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn malformed_cache_is_refetched() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        store.set(MACHINES, "garbage").unwrap();
        let source = FakeSource::new(vec![row(["d", "t", "alpha", "easy", "u"])]);
        let rows = Catalog::new(&mut store, &source).list(false).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn missing_api_key_propagates() {
        let dir = TempDir::new().unwrap();
        let mut store = ConfigStore::open(dir.path().join("config.json")).unwrap();
        let source = FakeSource::new(vec![]);
        let err = Catalog::new(&mut store, &source).list(false).unwrap_err();
        assert!(matches!(err, Error::ApiKeyMissing));
        assert!(!store.exists(MACHINES));
    }

    #[test]
    fn ensure_exists_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        let source = FakeSource::new(vec![row(["d", "t", "box01", "easy", "u"])]);
        let mut catalog = Catalog::new(&mut store, &source);

        assert_eq!(catalog.ensure_exists("BOX01").unwrap().name(), Some("box01"));
        match catalog.ensure_exists("box02") {
            Err(Error::MachineNotFound(name)) => assert_eq!(name, "box02"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn ensure_exists_only_matches_the_name_field() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_key(&dir);
        let source = FakeSource::new(vec![row(["d", "t", "alpha", "easy", "u"])]);
        let mut catalog = Catalog::new(&mut store, &source);
        assert!(catalog.ensure_exists("easy").is_err());
    }

    fn sample() -> Vec<MachineRecord> {
        vec![
            row(["1", "t", "a", "easy", "u"]),
            row(["2", "t", "b", "hard", "u"]),
            row(["3", "t", "c", "pending", "u"]),
            row(["4", "t", "d", "easy", "u"]),
            row(["5", "t", "e", "finished", "u"]),
        ]
    }

    fn names(rows: Vec<&MachineRecord>) -> Vec<&str> {
        rows.into_iter().filter_map(MachineRecord::name).collect()
    }

    #[test]
    fn filter_by_level() {
        let rows = sample();
        let filter = ListFilter {
            level: LevelFilter::parse("Easy"),
            ..Default::default()
        };
        assert_eq!(names(filter.apply(&rows)), ["a", "d"]);
        assert_eq!(ListFilter::default().apply(&rows).len(), 5);
    }

    #[test]
    fn unknown_level_means_all() {
        assert_eq!(LevelFilter::parse("insane"), LevelFilter::All);
    }

    #[test]
    fn status_filters_override_level() {
        let rows = sample();
        let filter = ListFilter {
            level: LevelFilter::Hard,
            pending: true,
            finished: true,
            ..Default::default()
        };
        assert_eq!(names(filter.apply(&rows)), ["c", "e"]);
    }

    #[test]
    fn descending_then_limit() {
        let rows = sample();
        let filter = ListFilter {
            limit: 2,
            descending: true,
            ..Default::default()
        };
        assert_eq!(names(filter.apply(&rows)), ["e", "d"]);
    }
}
