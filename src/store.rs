//src/store.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::calendar::YearMonth;
use crate::db::DbError;

/// Storage key holding the navigation offset.
pub const NAV_KEY: &str = "nav";
/// Storage key holding the JSON snapshot of all entries.
pub const ENTRIES_KEY: &str = "workoutEntries";

/// Synchronous string storage addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DbError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), DbError>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The workout data saved for one calendar date.
///
/// Reads both absent fields and the empty strings / `null` emoji written by
/// earlier versions; empty text counts as "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl WorkoutEntry {
    pub fn text1(&self) -> Option<&str> {
        non_empty(&self.text1)
    }

    pub fn text2(&self) -> Option<&str> {
        non_empty(&self.text2)
    }

    pub fn emoji(&self) -> Option<&str> {
        non_empty(&self.emoji)
    }

    pub fn duration(&self) -> Option<&str> {
        non_empty(&self.duration)
    }

    /// The set workout labels, text1 first.
    pub fn labels(&self) -> Vec<&str> {
        self.text1().into_iter().chain(self.text2()).collect()
    }

    /// True when neither label nor emoji is set. Such entries are never stored.
    pub fn is_blank(&self) -> bool {
        self.text1().is_none() && self.text2().is_none() && self.emoji().is_none()
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// All entries, one per date key, ordered by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: BTreeMap<String, WorkoutEntry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the entry snapshot. Missing or unparseable data yields an empty store;
    /// a single malformed entry is dropped and the others are kept.
    pub fn load(kv: &dyn KeyValueStore) -> Result<Self, DbError> {
        let Some(raw) = kv.get(ENTRIES_KEY)? else {
            return Ok(Self::new());
        };

        let raw_entries: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Ignoring corrupt '{ENTRIES_KEY}' value: {e}");
                return Ok(Self::new());
            }
        };

        let mut entries = BTreeMap::new();
        let mut blank = 0;
        for (key, value) in raw_entries {
            match serde_json::from_value::<WorkoutEntry>(value) {
                Ok(entry) if entry.is_blank() => blank += 1,
                Ok(entry) => {
                    entries.insert(key, entry);
                }
                Err(e) => log::warn!("Dropping malformed entry for {key}: {e}"),
            }
        }
        if blank > 0 {
            log::warn!("Dropped {blank} blank entries on load");
        }

        Ok(Self { entries })
    }

    /// Writes the whole map as one JSON snapshot.
    pub fn persist(&self, kv: &mut dyn KeyValueStore) -> Result<(), DbError> {
        let snapshot = serde_json::to_string(&self.entries)?;
        kv.set(ENTRIES_KEY, &snapshot)?;
        log::debug!("Persisted {} entries", self.entries.len());
        Ok(())
    }

    pub fn get(&self, date: NaiveDate) -> Option<&WorkoutEntry> {
        self.entries.get(&date_key(date))
    }

    pub fn get_by_key(&self, key: &str) -> Option<&WorkoutEntry> {
        self.entries.get(key)
    }

    /// Stores `entry` under `date`, replacing any previous one. A blank entry
    /// removes the date instead. Returns whether an entry is now stored.
    pub fn upsert(&mut self, date: NaiveDate, entry: WorkoutEntry) -> bool {
        if entry.is_blank() {
            self.remove(date);
            false
        } else {
            self.entries.insert(date_key(date), entry);
            true
        }
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<WorkoutEntry> {
        self.entries.remove(&date_key(date))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose key falls inside `month`, in date order.
    pub fn entries_in_month(
        &self,
        month: YearMonth,
    ) -> impl Iterator<Item = (&str, &WorkoutEntry)> {
        let prefix = month.key_prefix();
        self.entries
            .range(prefix.clone()..)
            .take_while(move |(key, _)| key.starts_with(&prefix))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Reads the persisted navigation offset; anything unreadable counts as 0.
pub fn load_nav(kv: &dyn KeyValueStore) -> Result<i32, DbError> {
    let Some(raw) = kv.get(NAV_KEY)? else {
        return Ok(0);
    };
    match raw.trim().parse::<i32>() {
        Ok(nav) => Ok(nav),
        Err(e) => {
            log::warn!("Ignoring corrupt '{NAV_KEY}' value {raw:?}: {e}");
            Ok(0)
        }
    }
}

pub fn save_nav(kv: &mut dyn KeyValueStore, nav: i32) -> Result<(), DbError> {
    kv.set(NAV_KEY, &nav.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_legacy_entry_shape() {
        let mut kv = MemoryStore::new();
        kv.set(
            ENTRIES_KEY,
            r#"{"2024-03-05":{"text1":"Run","text2":"","emoji":null,"duration":"1h"}}"#,
        )
        .unwrap();

        let store = EntryStore::load(&kv).unwrap();
        let entry = store.get(date(2024, 3, 5)).unwrap();
        assert_eq!(entry.labels(), vec!["Run"]);
        assert_eq!(entry.emoji(), None);
        assert_eq!(entry.duration(), Some("1h"));
    }

    #[test]
    fn corrupt_values_load_as_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(ENTRIES_KEY, "{not json").unwrap();
        kv.set(NAV_KEY, "sideways").unwrap();

        assert!(EntryStore::load(&kv).unwrap().is_empty());
        assert_eq!(load_nav(&kv).unwrap(), 0);
    }

    #[test]
    fn blank_entries_are_dropped_on_load() {
        let mut kv = MemoryStore::new();
        kv.set(
            ENTRIES_KEY,
            r#"{"2024-03-05":{"text1":"","text2":"","emoji":null,"duration":"30"},"2024-03-06":{"emoji":"🔥"}}"#,
        )
        .unwrap();

        let store = EntryStore::load(&kv).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(date(2024, 3, 6)).is_some());
    }

    #[test]
    fn month_range_stops_at_month_end() {
        let mut store = EntryStore::new();
        let run = WorkoutEntry {
            text1: Some("Run".into()),
            ..Default::default()
        };
        store.upsert(date(2024, 2, 29), run.clone());
        store.upsert(date(2024, 3, 1), run.clone());
        store.upsert(date(2024, 3, 31), run.clone());
        store.upsert(date(2024, 4, 1), run);

        let keys: Vec<&str> = store
            .entries_in_month(YearMonth::new(2024, 3).unwrap())
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["2024-03-01", "2024-03-31"]);
    }
}
