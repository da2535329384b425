// File: src/daily_log.rs
use crate::core::types::{DietProfile, MenuAssignment, StationDish};
use crate::error::PersistenceError;
use crate::persistence::{append_log_entry, read_log};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One issued menu as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub diet_profile: DietProfile,
    pub stations: Vec<StationDish>,
}

impl DailyLogEntry {
    /// Calendar date in the offset the entry was issued in.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

impl From<&MenuAssignment> for DailyLogEntry {
    fn from(menu: &MenuAssignment) -> Self {
        Self {
            timestamp: menu.issued_at,
            diet_profile: menu.profile,
            stations: menu.stations.clone(),
        }
    }
}

/// Read-side filter. Unset fields match everything; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub dish: Option<String>,
}

impl LogQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            dish: None,
        }
    }

    pub fn with_dish(mut self, dish: &str) -> Self {
        self.dish = Some(dish.to_string());
        self
    }

    /// Reads `[<from> <to>] [dish <name...>]`, dates as `YYYY-MM-DD`.
    pub fn parse_words(words: &[&str]) -> Result<Self, String> {
        let parse_date = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("bad date '{}'", s))
        };
        let (query, rest) = match words {
            [from, to, rest @ ..] if !from.eq_ignore_ascii_case("dish") => {
                (Self::between(parse_date(*from)?, parse_date(*to)?), rest)
            }
            rest => (Self::all(), rest),
        };
        match rest {
            [] => Ok(query),
            [keyword, name @ ..] if keyword.eq_ignore_ascii_case("dish") && !name.is_empty() => {
                Ok(query.with_dish(&name.join(" ")))
            }
            _ => Err("usage: [<from> <to>] [dish <name>]".to_string()),
        }
    }

    pub fn matches(&self, entry: &DailyLogEntry) -> bool {
        let date = entry.date();
        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }
        match &self.dish {
            Some(dish) => entry.stations.iter().any(|s| &s.dish == dish),
            None => true,
        }
    }
}

/// Append-only history of issued menus, mirrored in memory.
#[derive(Debug, Clone, Default)]
pub struct DailyLog {
    entries: Vec<DailyLogEntry>,
    path: Option<PathBuf>,
}

impl DailyLog {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        Ok(Self {
            entries: read_log(path)?,
            path: Some(path.to_path_buf()),
        })
    }

    /// Writes through to disk first; memory only changes once the line is synced.
    pub fn append(&mut self, entry: DailyLogEntry) -> Result<(), PersistenceError> {
        if let Some(path) = &self.path {
            append_log_entry(&entry, path)?;
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn query(&self, query: &LogQuery) -> Vec<&DailyLogEntry> {
        self.entries.iter().filter(|e| query.matches(e)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&DailyLogEntry> {
        self.entries.last()
    }
}
