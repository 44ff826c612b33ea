//! Monitoring loop.
//!
//! Runs one cycle at a time, sleeps for the configured interval, and
//! repeats until cancelled or the cycle limit is reached. Cycles never
//! overlap: the next one starts only after the previous state is final.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::scanner::Scanner;
use crate::types::{Event, ScanState};

/// What the loop accomplished before it stopped.
#[derive(Debug, Clone, Default)]
pub struct MonitorSummary {
    pub cycles: u64,
    pub cancelled: bool,
    pub last_state: Option<ScanState>,
}

pub struct Monitor {
    config: Arc<MonitorConfig>,
    scanner: Scanner,
}

impl Monitor {
    pub fn new(config: Arc<MonitorConfig>, events: mpsc::Sender<Event>) -> Self {
        let scanner = Scanner::new(config.clone(), events);
        Self { config, scanner }
    }

    /// Run cycles until `cancel` fires or `max_cycles` completes.
    ///
    /// A cancellation mid-cycle abandons that cycle; its partial state is
    /// discarded.
    pub async fn run(self, cancel: CancellationToken) -> MonitorSummary {
        let mut summary = MonitorSummary::default();
        let mut previous: Option<ScanState> = None;

        tracing::info!(
            network = %self.config.network,
            hosts = self.config.host_count(),
            ports = ?self.config.ports,
            endpoints = self.config.endpoint_count(),
            max_concurrency = self.config.max_concurrency,
            mode = ?self.config.mode,
            "monitor started"
        );

        loop {
            let cycle = summary.cycles + 1;
            tracing::info!(cycle, "scan cycle started");

            let prev = if self.config.change_only() {
                previous.as_ref()
            } else {
                None
            };
            let report = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(cycle, "scan cycle abandoned");
                    summary.cancelled = true;
                    break;
                }
                report = self.scanner.run_cycle(prev) => report,
            };

            tracing::info!(
                cycle,
                endpoints = report.state.len(),
                open = report.state.open_count(),
                events = report.events,
                peak_in_flight = report.peak_in_flight,
                duration_ms = report.duration.as_millis() as u64,
                "scan cycle finished"
            );

            summary.cycles = cycle;
            previous = Some(report.state);

            if self.config.max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        summary.last_state = previous;
        summary
    }
}
