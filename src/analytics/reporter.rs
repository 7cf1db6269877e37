//! Event log aggregation for `ironlady events`.

use crate::aggregate::{SeriesPoint, count_by, to_series};
use crate::analytics::events::{self, Event};

/// Summary of the failure log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    pub total: usize,
    /// Events per kind, in order of first appearance.
    pub by_kind: Vec<SeriesPoint>,
    /// Events per target, most frequent first.
    pub by_target: Vec<SeriesPoint>,
    /// Most recent events, newest first.
    pub latest: Vec<Event>,
}

/// Load the configured log (optionally limited to the last `days` days)
/// and summarize it.
pub fn compute_report(days: Option<u32>, latest: usize) -> EventReport {
    build_report(&events::read_events_since_days(days), latest)
}

pub fn build_report(entries: &[Event], latest: usize) -> EventReport {
    let by_kind = to_series(&count_by(entries, |e| e.kind.as_str()));

    let mut by_target = to_series(&count_by(entries, |e| e.target.clone()));
    // Stable sort keeps first-seen order among ties.
    by_target.sort_by(|a, b| b.value.cmp(&a.value));

    EventReport {
        total: entries.len(),
        by_kind,
        by_target,
        latest: entries.iter().rev().take(latest).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::events::EventKind;

    fn event(kind: EventKind, target: &str) -> Event {
        Event::new(kind, target, "failed")
    }

    #[test]
    fn empty_log() {
        let report = build_report(&[], 5);
        assert_eq!(report.total, 0);
        assert!(report.by_kind.is_empty());
        assert!(report.latest.is_empty());
    }

    #[test]
    fn groups_by_kind_and_target() {
        let entries = vec![
            event(EventKind::FetchFailed, "participants"),
            event(EventKind::ChatFallback, "chat"),
            event(EventKind::FetchFailed, "programs"),
            event(EventKind::ChatFallback, "chat"),
            event(EventKind::ChatFallback, "chat"),
        ];
        let report = build_report(&entries, 2);

        assert_eq!(report.total, 5);
        assert_eq!(report.by_kind[0].name, "fetch_failed");
        assert_eq!(report.by_kind[0].value, 2);
        assert_eq!(report.by_kind[1].name, "chat_fallback");
        assert_eq!(report.by_kind[1].value, 3);

        assert_eq!(report.by_target[0].name, "chat");
        assert_eq!(report.by_target[1].name, "participants");

        assert_eq!(report.latest.len(), 2);
        assert_eq!(report.latest[0].target, "chat");
    }
}
