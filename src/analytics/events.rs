//! Failure event log.
//!
//! Every failure the views and the chat transcript absorb (a list fetch
//! that degrades to an empty table, a rejected save, a chat fallback) is
//! appended as one JSON line so it can be inspected later with
//! `ironlady events`.
//!
//! Log file: `~/.ironlady/events.jsonl` unless configured otherwise.

use std::fmt;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FetchFailed,
    MutationFailed,
    ChatFallback,
    QuickQuestionsFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailed => "fetch_failed",
            Self::MutationFailed => "mutation_failed",
            Self::ChatFallback => "chat_fallback",
            Self::QuickQuestionsFailed => "quick_questions_failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub kind: EventKind,
    /// What failed, e.g. `participants`, `POST /programs`, `chat`.
    pub target: String,
    pub message: String,
}

impl Event {
    pub fn new(kind: EventKind, target: &str, message: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            target: target.to_string(),
            message: message.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

static DESTINATION: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Fix where events go for the rest of the process. `None` disables the
/// log. Only the first call has any effect; without a call the default
/// path is used (unit tests log nowhere).
pub fn init(path: Option<PathBuf>) {
    let _ = DESTINATION.set(path);
}

/// Resolved log path, or `None` when logging is disabled or there is no
/// home directory.
pub fn log_path() -> Option<PathBuf> {
    DESTINATION
        .get_or_init(|| if cfg!(test) { None } else { default_log_path() })
        .clone()
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ironlady").join("events.jsonl"))
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append an event. Best-effort: I/O failures are ignored.
pub fn record(kind: EventKind, target: &str, message: &str) {
    let Some(path) = log_path() else {
        return;
    };
    let _ = append_event(&path, &Event::new(kind, target, message));
}

pub fn append_event(path: &Path, event: &Event) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read every event from `path`, skipping malformed lines. A missing file
/// reads as empty.
pub fn read_events(path: &Path) -> Vec<Event> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(std::io::Result::ok)
        .filter_map(|line| serde_json::from_str::<Event>(&line).ok())
        .collect()
}

/// Events from the configured log, limited to the last `days` days when
/// given.
pub fn read_events_since_days(days: Option<u32>) -> Vec<Event> {
    let Some(path) = log_path() else {
        return Vec::new();
    };
    let events = read_events(&path);

    let Some(days) = days else {
        return events;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    events
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}
