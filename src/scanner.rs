use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::MonitorConfig;
use crate::differ;
use crate::limiter::ConcurrencyLimiter;
use crate::probe::probe;
use crate::targets::enumerate_endpoints;
use crate::types::{Event, ProbeOutcome, ScanState};

/// Summary of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub state: ScanState,
    /// Events handed to the output channel.
    pub events: usize,
    /// Most probes that held a limiter slot at the same time.
    pub peak_in_flight: usize,
    pub duration: Duration,
}

/// Runs scan cycles against a fixed configuration.
///
/// - Holds no state between cycles; the caller threads the previous
///   `ScanState` through.
/// - Probes are spawned only after a limiter slot is free, so neither
///   sockets nor tasks grow past the concurrency ceiling.
/// - Outcomes are consumed in completion order by this single flow, which
///   owns the `ScanState` under construction.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: Arc<MonitorConfig>,
    limiter: ConcurrencyLimiter,
    events: mpsc::Sender<Event>,
}

impl Scanner {
    pub fn new(config: Arc<MonitorConfig>, events: mpsc::Sender<Event>) -> Self {
        let limiter = ConcurrencyLimiter::new(config.max_concurrency);
        Self {
            config,
            limiter,
            events,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Probe every enumerated endpoint once and return the finished state.
    ///
    /// Dropping the returned future aborts all in-flight probes.
    pub async fn run_cycle(&self, previous: Option<&ScanState>) -> CycleReport {
        let start = Instant::now();
        let endpoints = enumerate_endpoints(&self.config);
        let mut state = ScanState::with_capacity(endpoints.len());
        let mut events = 0usize;
        let timeout = self.config.timeout;
        self.limiter.reset_peak();

        let mut set: JoinSet<ProbeOutcome> = JoinSet::new();
        let mut queue = endpoints.iter().cloned();
        let mut next = queue.next();

        loop {
            tokio::select! {
                biased;
                Some(joined) = set.join_next() => match joined {
                    Ok(outcome) => {
                        if self.accept(outcome, previous, &mut state).await {
                            events += 1;
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "probe task failed"),
                },
                slot = self.limiter.acquire(), if next.is_some() => {
                    if let Some(endpoint) = next.take() {
                        set.spawn(async move {
                            let _slot = slot;
                            probe(endpoint, timeout).await
                        });
                    }
                    next = queue.next();
                }
                else => break,
            }
        }

        // A failed task leaves a gap; it reads as not-open like any other miss.
        if state.len() < endpoints.len() {
            for endpoint in &endpoints {
                if !state.contains(endpoint) {
                    tracing::warn!(endpoint = %endpoint, "no outcome recorded, treating as closed");
                    let outcome = ProbeOutcome {
                        endpoint: endpoint.clone(),
                        open: false,
                    };
                    if self.accept(outcome, previous, &mut state).await {
                        events += 1;
                    }
                }
            }
        }

        CycleReport {
            state,
            events,
            peak_in_flight: self.limiter.peak(),
            duration: start.elapsed(),
        }
    }

    /// Record one outcome and emit its event. Returns whether an event was emitted.
    async fn accept(
        &self,
        outcome: ProbeOutcome,
        previous: Option<&ScanState>,
        state: &mut ScanState,
    ) -> bool {
        let event = differ::event_for(self.config.mode, previous, &outcome);
        let endpoint = outcome.endpoint.clone();
        if !state.record(outcome) {
            tracing::warn!(endpoint = %endpoint, "duplicate outcome ignored");
            return false;
        }
        match event {
            Some(event) => {
                if self.events.send(event).await.is_err() {
                    tracing::debug!(endpoint = %endpoint, "event channel closed, dropping event");
                }
                true
            }
            None => false,
        }
    }
}
