// src/crawl/context.rs
// =============================================================================
// Everything the workers of one run share, bundled behind a single Arc.
//
// Each worker gets a clone of Arc<CrawlContext> when it is spawned. All
// mutation goes through the atomic operations of the pieces inside (queue
// push/pop, frontier claim, coordinator finish), so workers never need a
// lock of their own.
// =============================================================================

use std::sync::Arc;
use tracing::error;

use super::frontier::FrontierSet;
use super::path::PathItem;
use super::queue::{BlockingQueue, Cancel};
use super::shutdown::{CrawlOutcome, ShutdownCoordinator};
use super::stats::CrawlStats;
use super::tracker::WorkTracker;

/// A fetched page waiting for the parse stage
pub struct ParseJob {
    pub path: PathItem,
    pub body: Vec<u8>,
}

pub struct CrawlContext {
    pub fetch_queue: Arc<BlockingQueue<PathItem>>,
    pub parse_queue: Arc<BlockingQueue<ParseJob>>,
    pub frontier: FrontierSet,
    pub shutdown: ShutdownCoordinator,
    pub tracker: WorkTracker,
    pub stats: CrawlStats,
}

impl CrawlContext {
    pub fn new() -> Self {
        let fetch_queue = Arc::new(BlockingQueue::new("fetch"));
        let parse_queue = Arc::new(BlockingQueue::new("parse"));
        let shutdown = ShutdownCoordinator::new(vec![
            Arc::clone(&fetch_queue) as Arc<dyn Cancel>,
            Arc::clone(&parse_queue) as Arc<dyn Cancel>,
        ]);

        Self {
            fetch_queue,
            parse_queue,
            frontier: FrontierSet::new(),
            shutdown,
            tracker: WorkTracker::new(),
            stats: CrawlStats::default(),
        }
    }

    // Counted push onto the fetch queue
    pub fn schedule_fetch(&self, path: PathItem) {
        self.tracker.schedule();
        if !self.fetch_queue.push(path) {
            // Cancelled; nobody will pop it, so don't leave it counted
            self.tracker.finish();
        }
    }

    // Counted push onto the parse queue
    pub fn schedule_parse(&self, job: ParseJob) {
        self.tracker.schedule();
        if !self.parse_queue.push(job) {
            self.tracker.finish();
        }
    }

    /// Marks a popped unit as in progress until the guard is dropped
    pub fn begin_unit(&self) -> UnitGuard<'_> {
        UnitGuard { ctx: self }
    }
}

impl Default for CrawlContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Finishes one unit of work on drop; the last one out ends the run
///
/// If the worker is unwinding from a panic the run is stopped instead. The
/// dead worker leaves its queue behind, so the count would never reach zero.
pub struct UnitGuard<'a> {
    ctx: &'a CrawlContext,
}

impl Drop for UnitGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("worker panicked, stopping the crawl");
            self.ctx.shutdown.stop();
        }
        if self.ctx.tracker.finish() {
            self.ctx.shutdown.finish(CrawlOutcome::Exhausted);
        }
    }
}
