// src/crawl/shutdown.rs
// =============================================================================
// Shutdown coordination for one crawl run.
//
// There is exactly one way for a run to end: somebody calls finish() with
// an outcome. The first caller wins; its outcome is stored in a set-once
// slot, the stop flag flips to true, every queue is cancelled (which wakes
// all sleeping workers) and the orchestrator waiting in wait() is woken.
// Every later call is a no-op.
//
// Who calls finish():
// - a parse worker that found the destination  -> Found { path }
// - the worker whose unit drained the crawl    -> Exhausted
// - stop() from an AbortHandle (Ctrl-C)        -> Cancelled
// =============================================================================

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::path::PathItem;
use super::queue::Cancel;

/// How a crawl run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// A chain of links from source to destination
    Found { path: PathItem },
    /// Every reachable page was explored without meeting the destination
    Exhausted,
    /// Stopped from outside before either of the above
    Cancelled,
}

impl CrawlOutcome {
    pub fn path(&self) -> Option<&PathItem> {
        match self {
            CrawlOutcome::Found { path } => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.path().is_some()
    }
}

pub struct ShutdownCoordinator {
    stopped: AtomicBool,
    outcome: Mutex<Option<CrawlOutcome>>,
    changed: Condvar,
    queues: Vec<Arc<dyn Cancel>>,
}

impl ShutdownCoordinator {
    pub fn new(queues: Vec<Arc<dyn Cancel>>) -> Self {
        Self {
            stopped: AtomicBool::new(false),
            outcome: Mutex::new(None),
            changed: Condvar::new(),
            queues,
        }
    }

    /// Cheap check used by workers between steps
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    // Records `outcome` and shuts the run down
    //
    // Returns true only for the call that actually won.
    pub fn finish(&self, outcome: CrawlOutcome) -> bool {
        let mut slot = self.outcome.lock();
        if slot.is_some() {
            return false;
        }
        debug!(?outcome, "crawl finishing");
        *slot = Some(outcome);
        self.stopped.store(true, Ordering::SeqCst);
        self.changed.notify_all();
        drop(slot);

        // Queue locks are taken after the slot lock is released
        for queue in &self.queues {
            queue.cancel();
            debug!(queue = queue.name(), "queue cancelled");
        }
        true
    }

    /// External stop; reported as Cancelled unless something already won
    pub fn stop(&self) -> bool {
        self.finish(CrawlOutcome::Cancelled)
    }

    /// Blocks until the run has an outcome
    pub fn wait(&self) -> CrawlOutcome {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.changed.wait(&mut slot);
        }
    }

    #[cfg(test)]
    pub fn outcome(&self) -> Option<CrawlOutcome> {
        self.outcome.lock().clone()
    }

    // Sleeps for `duration` unless the run stops first
    //
    // Returns true if the run was stopped (the caller should give up).
    pub fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.is_stopped();
        }

        let deadline = Instant::now() + duration;
        let mut slot = self.outcome.lock();
        while slot.is_none() {
            if self.changed.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::queue::BlockingQueue;
    use std::thread;

    fn coordinator_with_queue() -> (Arc<ShutdownCoordinator>, Arc<BlockingQueue<u32>>) {
        let queue = Arc::new(BlockingQueue::new("test"));
        let coordinator = Arc::new(ShutdownCoordinator::new(vec![
            Arc::clone(&queue) as Arc<dyn Cancel>
        ]));
        (coordinator, queue)
    }

    #[test]
    fn test_first_outcome_wins() {
        let (coordinator, _queue) = coordinator_with_queue();
        let path = PathItem::root("/A").extend("/B");

        assert!(coordinator.finish(CrawlOutcome::Found { path: path.clone() }));
        assert!(!coordinator.finish(CrawlOutcome::Exhausted));
        assert!(!coordinator.stop());

        assert!(coordinator.is_stopped());
        assert_eq!(coordinator.outcome(), Some(CrawlOutcome::Found { path }));
    }

    #[test]
    fn test_stop_cancels_queues_and_wakes_waiters() {
        let (coordinator, queue) = coordinator_with_queue();

        let worker = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_blocking())
        };
        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.wait())
        };

        thread::sleep(Duration::from_millis(20));
        assert!(coordinator.stop());

        assert_eq!(worker.join().unwrap(), None);
        assert_eq!(waiter.join().unwrap(), CrawlOutcome::Cancelled);
        assert!(queue.is_cancelled());
    }

    #[test]
    fn test_sleep_is_interrupted_by_stop() {
        let (coordinator, _queue) = coordinator_with_queue();

        let sleeper = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                let started = Instant::now();
                let stopped = coordinator.sleep(Duration::from_secs(30));
                (stopped, started.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        coordinator.finish(CrawlOutcome::Exhausted);

        let (stopped, elapsed) = sleeper.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_sleep_times_out_normally() {
        let (coordinator, _queue) = coordinator_with_queue();
        assert!(!coordinator.sleep(Duration::from_millis(5)));
    }

    #[test]
    fn test_outcome_json() {
        let found = CrawlOutcome::Found {
            path: PathItem::root("/A").extend("/C"),
        };
        assert_eq!(
            serde_json::to_string(&found).unwrap(),
            r#"{"status":"found","path":["/A","/C"]}"#
        );
        assert_eq!(
            serde_json::to_string(&CrawlOutcome::Exhausted).unwrap(),
            r#"{"status":"exhausted"}"#
        );
    }
}
