//! Concurrency ceiling for probes.
//!
//! A counting semaphore caps how many probes hold a socket at once, no
//! matter how many endpoints a cycle enumerates. Waiters are not served in
//! any guaranteed order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max: usize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyLimiter {
    /// `max` is clamped to at least one slot.
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for a free slot. The slot is held until the permit is dropped.
    pub async fn acquire(&self) -> LimiterPermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        LimiterPermit {
            in_flight: self.in_flight.clone(),
            _permit: permit,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of permits held at once since creation or the last reset.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    pub fn reset_peak(&self) {
        self.peak.store(self.in_flight(), Ordering::Release);
    }
}

/// A held limiter slot.
#[derive(Debug)]
pub struct LimiterPermit {
    in_flight: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for LimiterPermit {
    fn drop(&mut self) {
        // Runs before the semaphore permit is returned.
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
