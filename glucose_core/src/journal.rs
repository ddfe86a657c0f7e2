//! Append-only event journal.
//!
//! Events are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. The estimation engine never touches
//! the journal; callers load a day's events and pass them in as a slice.

use crate::time::is_on_date;
use crate::{Error, Event, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One journal line: a logged event plus bookkeeping
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JournalRecord {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl JournalRecord {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            event,
        }
    }
}

/// Event sink trait for persisting logged events
pub trait EventSink {
    fn append(&mut self, record: &JournalRecord) -> Result<()>;
}

/// JSONL-based event sink with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    /// Create a new JSONL journal for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl EventSink for JsonlJournal {
    fn append(&mut self, record: &JournalRecord) -> Result<()> {
        if matches!(record.event, Event::Unknown) {
            return Err(Error::Journal("refusing to log an unknown event".into()));
        }

        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended event {} to journal", record.id);
        Ok(())
    }
}

/// Read all records from a journal file
///
/// Malformed lines are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<JournalRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from journal", records.len());
    Ok(records)
}

/// Events whose timestamp falls on `date`, in journal order
pub fn events_on(path: &Path, date: NaiveDate) -> Result<Vec<Event>> {
    Ok(read_records(path)?
        .into_iter()
        .map(|r| r.event)
        .filter(|e| e.timestamp().is_some_and(|ts| is_on_date(ts, date)))
        .collect())
}

/// Events for each of `dates`, read with a single pass over the journal
pub fn load_days(path: &Path, dates: &[NaiveDate]) -> Result<Vec<(NaiveDate, Vec<Event>)>> {
    let records = read_records(path)?;
    let days = dates
        .iter()
        .map(|date| {
            let events = records
                .iter()
                .filter(|r| {
                    r.event
                        .timestamp()
                        .is_some_and(|ts| is_on_date(ts, *date))
                })
                .map(|r| r.event.clone())
                .collect();
            (*date, events)
        })
        .collect();
    Ok(days)
}
