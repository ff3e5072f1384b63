//! JSON file cache of exchange rates.
//!
//! One file holds the most recent [`RateTable`]. Entries older than the
//! validity window (24 hours by default) are ignored, and a cache that
//! cannot be read or parsed is treated as empty.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use super::RateTable;
use crate::config::APP_NAME;
use crate::error::{LedgerError, Result};

/// File name of the cache inside the cache directory.
const CACHE_FILE: &str = "rates.json";

/// Default validity window of cached rates, in hours.
const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// File-backed store for the latest exchange rates.
#[derive(Debug, Clone)]
pub struct RateCache {
    /// Location of the JSON file.
    path: PathBuf,
    /// How long a stored table stays valid.
    max_age: TimeDelta,
}

impl RateCache {
    /// Creates a cache stored at `path` with a 24-hour validity window.
    #[inline]
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_age: TimeDelta::hours(DEFAULT_MAX_AGE_HOURS),
        }
    }

    /// Overrides the validity window.
    #[inline]
    #[must_use]
    pub const fn with_max_age(mut self, max_age: TimeDelta) -> Self {
        self.max_age = max_age;
        self
    }

    /// Returns the platform cache path (`$XDG_CACHE_HOME/ledger-report/rates.json`).
    #[inline]
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(APP_NAME).join(CACHE_FILE))
    }

    /// Opens the cache at the platform default location.
    #[inline]
    #[must_use]
    pub fn open_default() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    /// Location of the cache file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored table regardless of age.
    ///
    /// Missing, unreadable or malformed files yield `None`.
    #[inline]
    #[must_use]
    pub fn load(&self) -> Option<RateTable> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not read rate cache");
                return None;
            }
        };
        serde_json::from_str(&contents)
            .inspect_err(|err| {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring malformed rate cache");
            })
            .ok()
    }

    /// Reads the stored table if it is quoted against `base` and still
    /// within the validity window at `now`.
    #[inline]
    #[must_use]
    pub fn load_fresh(&self, base: &str, now: DateTime<Utc>) -> Option<RateTable> {
        self.load()
            .filter(|table| table.base == base && !table.rates.is_empty())
            .filter(|table| self.is_fresh(table, now))
    }

    /// Returns `true` if `table` was fetched less than `max_age` before `now`.
    #[inline]
    #[must_use]
    pub fn is_fresh(&self, table: &RateTable, now: DateTime<Utc>) -> bool {
        table
            .fetched_at
            .is_some_and(|fetched| now.signed_duration_since(fetched) < self.max_age)
    }

    /// Atomically replaces the stored table (write-to-tmp then rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    #[inline]
    pub fn save(&self, table: &RateTable) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| LedgerError::io(dir, err))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(table)?;
        fs::write(&tmp_path, json).map_err(|err| LedgerError::io(&tmp_path, err))?;
        fs::rename(&tmp_path, &self.path).map_err(|err| LedgerError::io(&self.path, err))?;
        tracing::debug!(path = %self.path.display(), rates = table.rates.len(), "saved rate cache");
        Ok(())
    }
}
