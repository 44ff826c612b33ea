//! Emission policy: decides which outcomes become output events.

use crate::config::OutputMode;
use crate::types::{Endpoint, Event, ProbeOutcome, ScanState};

/// True when `current` differs from the endpoint's value in `previous`.
/// An endpoint with no prior value always counts as changed.
pub fn changed(previous: &ScanState, endpoint: &Endpoint, current: bool) -> bool {
    previous.get(endpoint) != Some(current)
}

/// The event, if any, that `outcome` produces.
///
/// Change-only mode needs a previous cycle to compare against; without one
/// it reports open endpoints exactly like all-open mode.
pub fn event_for(
    mode: OutputMode,
    previous: Option<&ScanState>,
    outcome: &ProbeOutcome,
) -> Option<Event> {
    match (mode, previous) {
        (OutputMode::ChangeOnly, Some(prev)) => {
            changed(prev, &outcome.endpoint, outcome.open).then(|| Event::Changed {
                endpoint: outcome.endpoint.clone(),
                previous: prev.get(&outcome.endpoint),
                open: outcome.open,
            })
        }
        _ => outcome.open.then(|| Event::Open(outcome.endpoint.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(host: &str, port: u16, open: bool) -> ProbeOutcome {
        ProbeOutcome {
            endpoint: Endpoint::new(host, port),
            open,
        }
    }

    #[test]
    fn all_open_reports_only_open() {
        assert_eq!(
            event_for(OutputMode::AllOpen, None, &outcome("10.0.0.1", 80, true)),
            Some(Event::Open(Endpoint::new("10.0.0.1", 80)))
        );
        assert_eq!(event_for(OutputMode::AllOpen, None, &outcome("10.0.0.1", 81, false)), None);
    }

    #[test]
    fn all_open_ignores_previous_state() {
        let prev: ScanState = [(Endpoint::new("10.0.0.1", 80), true)].into_iter().collect();
        assert!(event_for(OutputMode::AllOpen, Some(&prev), &outcome("10.0.0.1", 80, true)).is_some());
    }

    #[test]
    fn change_only_false_to_true_and_unknown_to_true() {
        let a = Endpoint::new("10.0.0.1", 80);
        let prev: ScanState = [(a.clone(), false)].into_iter().collect();

        let ev_a = event_for(OutputMode::ChangeOnly, Some(&prev), &outcome("10.0.0.1", 80, true));
        assert_eq!(
            ev_a,
            Some(Event::Changed {
                endpoint: a,
                previous: Some(false),
                open: true
            })
        );

        let ev_b = event_for(OutputMode::ChangeOnly, Some(&prev), &outcome("10.0.0.2", 80, true));
        assert_eq!(
            ev_b,
            Some(Event::Changed {
                endpoint: Endpoint::new("10.0.0.2", 80),
                previous: None,
                open: true
            })
        );
    }

    #[test]
    fn change_only_unknown_to_false_still_counts() {
        let prev = ScanState::new();
        let ev = event_for(OutputMode::ChangeOnly, Some(&prev), &outcome("10.0.0.3", 22, false));
        assert_eq!(ev.map(|e| e.to_string()), Some("10.0.0.3:22 -> CLOSED".to_string()));
    }

    #[test]
    fn change_only_unchanged_is_silent() {
        let prev: ScanState = [
            (Endpoint::new("10.0.0.1", 80), true),
            (Endpoint::new("10.0.0.1", 443), false),
        ]
        .into_iter()
        .collect();
        assert_eq!(event_for(OutputMode::ChangeOnly, Some(&prev), &outcome("10.0.0.1", 80, true)), None);
        assert_eq!(event_for(OutputMode::ChangeOnly, Some(&prev), &outcome("10.0.0.1", 443, false)), None);
    }

    #[test]
    fn change_only_first_cycle_reports_open() {
        assert_eq!(
            event_for(OutputMode::ChangeOnly, None, &outcome("10.0.0.1", 80, true)),
            Some(Event::Open(Endpoint::new("10.0.0.1", 80)))
        );
        assert_eq!(event_for(OutputMode::ChangeOnly, None, &outcome("10.0.0.1", 81, false)), None);
    }
}
