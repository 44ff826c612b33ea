use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One TCP target, identified by host and port.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Result of probing one endpoint once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub endpoint: Endpoint,
    pub open: bool,
}

/// Open/closed result set of one cycle, one entry per enumerated endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    entries: HashMap<Endpoint, bool>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Record an outcome. Returns `false` and keeps the existing value when the
    /// endpoint was already recorded.
    pub fn record(&mut self, outcome: ProbeOutcome) -> bool {
        use std::collections::hash_map::Entry;
        match self.entries.entry(outcome.endpoint) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(outcome.open);
                true
            }
        }
    }

    /// `None` means the endpoint was never recorded in this state.
    pub fn get(&self, endpoint: &Endpoint) -> Option<bool> {
        self.entries.get(endpoint).copied()
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.entries.contains_key(endpoint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.entries.values().filter(|open| **open).count()
    }

    /// Open endpoints, sorted for stable output.
    pub fn open_endpoints(&self) -> Vec<&Endpoint> {
        let mut open: Vec<&Endpoint> = self
            .entries
            .iter()
            .filter_map(|(ep, open)| open.then_some(ep))
            .collect();
        open.sort();
        open
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, bool)> {
        self.entries.iter().map(|(ep, open)| (ep, *open))
    }
}

impl FromIterator<(Endpoint, bool)> for ScanState {
    fn from_iter<I: IntoIterator<Item = (Endpoint, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A line-worthy observation produced while a cycle completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Endpoint accepted a connection (all-open reporting).
    Open(Endpoint),
    /// Endpoint reachability differs from the previous cycle; `previous` is
    /// `None` when the endpoint had no prior value.
    Changed {
        endpoint: Endpoint,
        previous: Option<bool>,
        open: bool,
    },
}

impl Event {
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Event::Open(ep) => ep,
            Event::Changed { endpoint, .. } => endpoint,
        }
    }

    pub fn is_open(&self) -> bool {
        match self {
            Event::Open(_) => true,
            Event::Changed { open, .. } => *open,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Open(ep) => write!(f, "[OPEN] {ep}"),
            Event::Changed { endpoint, open, .. } => {
                let state = if *open { "OPEN" } else { "CLOSED" };
                write!(f, "{endpoint} -> {state}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_lines_match_console_format() {
        let ep = Endpoint::new("192.168.1.7", 443);
        assert_eq!(Event::Open(ep.clone()).to_string(), "[OPEN] 192.168.1.7:443");
        let closed = Event::Changed {
            endpoint: ep.clone(),
            previous: Some(true),
            open: false,
        };
        assert_eq!(closed.to_string(), "192.168.1.7:443 -> CLOSED");
        let opened = Event::Changed {
            endpoint: ep,
            previous: None,
            open: true,
        };
        assert_eq!(opened.to_string(), "192.168.1.7:443 -> OPEN");
    }

    #[test]
    fn record_keeps_first_value() {
        let ep = Endpoint::new("10.0.0.1", 80);
        let mut state = ScanState::new();
        assert!(state.record(ProbeOutcome { endpoint: ep.clone(), open: true }));
        assert!(!state.record(ProbeOutcome { endpoint: ep.clone(), open: false }));
        assert_eq!(state.len(), 1);
        assert_eq!(state.get(&ep), Some(true));
    }

    #[test]
    fn unknown_endpoint_is_none() {
        let state = ScanState::new();
        assert_eq!(state.get(&Endpoint::new("10.0.0.1", 80)), None);
    }

    #[test]
    fn open_endpoints_sorted() {
        let state: ScanState = [
            (Endpoint::new("10.0.0.2", 80), true),
            (Endpoint::new("10.0.0.1", 443), true),
            (Endpoint::new("10.0.0.1", 80), false),
        ]
        .into_iter()
        .collect();
        let open: Vec<String> = state.open_endpoints().iter().map(|e| e.to_string()).collect();
        assert_eq!(open, vec!["10.0.0.1:443", "10.0.0.2:80"]);
        assert_eq!(state.open_count(), 2);
    }
}
