// src/crawl/tracker.rs
// =============================================================================
// In-flight work counter used to notice that the crawl has run dry.
//
// Every unit of work (a path waiting to be fetched, or a page waiting to be
// parsed) is counted from the moment it is pushed until the worker that
// popped it is completely done with it. A worker always schedules its
// follow-up work BEFORE finishing its own unit, so the count can only reach
// zero when both queues are empty and every worker is idle.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct WorkTracker {
    in_flight: AtomicUsize,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call before pushing a unit onto a queue
    pub fn schedule(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    // Call when a popped unit is fully handled
    //
    // Returns true for the call that brought the count to zero.
    pub fn finish(&self) -> bool {
        self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }
}
