//! Dispatch metrics
//!
//! Prometheus counters for raised events and handler outcomes, plus an
//! in-memory tally for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::EventKind;
use metrics::counter;

/// Record one raised event, one increment per kind bit
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_event_raised;
///
/// record_event_raised(EventKind::IMAGE_DETECTED | EventKind::IMAGEM_DETECTED);
/// dispatcher.dispatch(&mut ctx, &event);
/// ```
pub fn record_event_raised(kind: EventKind) {
    counter!("motion_events_raised_total").increment(1);

    for (name, _) in kind.iter_names() {
        counter!("motion_event_kind_total", "kind" => name.to_string()).increment(1);
    }
}

/// Record handler totals as reported by the dispatcher
pub fn record_handler_outcomes(handler: &str, acted: u64, skipped: u64, aborted: u64) {
    for (outcome, count) in [("acted", acted), ("skipped", skipped), ("aborted", aborted)] {
        if count > 0 {
            counter!(
                "motion_handler_outcomes_total",
                "handler" => handler.to_string(),
                "outcome" => outcome.to_string()
            )
            .increment(count);
        }
    }
}

/// Counts raised events per kind bit
#[derive(Debug, Clone, Default)]
pub struct DispatchTally {
    /// Total raised events
    pub total_events: u64,

    /// Events with no kind bit set
    pub empty_events: u64,

    /// Per kind-bit counts, keyed by flag name
    pub by_kind: BTreeMap<String, u64>,
}

impl DispatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, kind: EventKind) {
        self.total_events += 1;
        if kind.is_empty() {
            self.empty_events += 1;
        }
        for (name, _) in kind.iter_names() {
            *self.by_kind.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    pub fn count(&self, name: &str) -> u64 {
        self.by_kind.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_each_bit() {
        let mut tally = DispatchTally::new();
        tally.update(EventKind::IMAGE_DETECTED | EventKind::IMAGEM_DETECTED);
        tally.update(EventKind::IMAGE_DETECTED);
        tally.update(EventKind::empty());

        assert_eq!(tally.total_events, 3);
        assert_eq!(tally.empty_events, 1);
        assert_eq!(tally.count("IMAGE_DETECTED"), 2);
        assert_eq!(tally.count("IMAGEM_DETECTED"), 1);
        assert_eq!(tally.count("IMAGE_SNAPSHOT"), 0);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_event_raised(EventKind::FILE_CREATE);
        record_handler_outcomes("file_created", 1, 0, 0);
    }
}
