// src/crawl/engine.rs
// =============================================================================
// The crawler: wires the queues, frontier and worker pools together for a
// single run.
//
// How a run goes:
// 1. Spawn the fetch pool and the parse pool (plain OS threads)
// 2. Claim the source in the frontier and push [source] onto the fetch queue
// 3. Block until the shutdown coordinator has an outcome
//    (found / exhausted / cancelled)
// 4. Join every worker; the coordinator already cancelled both queues, so
//    each worker wakes up, sees None from pop_blocking() and exits
// 5. Return the outcome plus counters and elapsed time
//
// Rust concepts:
// - Arc<dyn Trait>: one fetcher/extractor shared by all threads
// - std::thread::Builder: named threads so logs and panics say who they were
// - Consuming self: a Crawler runs exactly once
// =============================================================================

use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::context::CrawlContext;
use super::fetch_stage::run_fetch_worker;
use super::parse_stage::run_parse_worker;
use super::path::PathItem;
use super::shutdown::CrawlOutcome;
use super::stats::StatsSnapshot;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::LinkExtractor;
use crate::fetch::PageFetcher;

/// Everything a finished run reports back
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub source: String,
    pub destination: String,
    #[serde(flatten)]
    pub outcome: CrawlOutcome,
    pub stats: StatsSnapshot,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Stops a running crawl from another thread (Ctrl-C handler, tests)
#[derive(Clone)]
pub struct AbortHandle {
    ctx: Arc<CrawlContext>,
}

impl AbortHandle {
    // Returns false if the run had already finished
    pub fn abort(&self) -> bool {
        self.ctx.shutdown.stop()
    }
}

// A running worker thread
struct Worker {
    name: String,
    handle: JoinHandle<()>,
}

impl Worker {
    fn spawn<F>(name: String, body: F) -> Result<Self, CrawlError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(body)
            .map_err(|source| CrawlError::WorkerSpawn {
                name: name.clone(),
                source,
            })?;
        Ok(Self { name, handle })
    }

    fn join(self) -> Result<(), CrawlError> {
        self.handle
            .join()
            .map_err(|_| CrawlError::WorkerPanicked { name: self.name })
    }
}

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    ctx: Arc<CrawlContext>,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Result<Self, CrawlError> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            extractor,
            ctx: Arc::new(CrawlContext::new()),
        })
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    // Runs the crawl and blocks until it ends
    pub fn run(self, source: &str, destination: &str) -> Result<CrawlReport, CrawlError> {
        let started = Instant::now();
        info!(
            source,
            destination,
            fetch_workers = self.config.fetch_workers,
            parse_workers = self.config.parse_workers,
            "starting crawl"
        );

        let outcome = if source == destination {
            CrawlOutcome::Found {
                path: PathItem::root(source),
            }
        } else {
            let workers = self.spawn_workers(destination)?;

            self.ctx.frontier.try_claim(source);
            self.ctx.schedule_fetch(PathItem::root(source));

            let outcome = self.ctx.shutdown.wait();
            debug!(?outcome, "waiting for workers to exit");
            join_all(workers)?;
            outcome
        };

        let report = CrawlReport {
            source: source.to_string(),
            destination: destination.to_string(),
            outcome,
            stats: self.ctx.stats.snapshot(),
            elapsed: started.elapsed(),
        };

        info!(
            found = report.outcome.is_found(),
            pages = report.stats.pages_fetched,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "crawl finished"
        );
        Ok(report)
    }

    fn spawn_workers(&self, destination: &str) -> Result<Vec<Worker>, CrawlError> {
        let destination: Arc<str> = Arc::from(destination);
        let mut workers =
            Vec::with_capacity(self.config.fetch_workers + self.config.parse_workers);

        for id in 0..self.config.fetch_workers {
            let ctx = Arc::clone(&self.ctx);
            let fetcher = Arc::clone(&self.fetcher);
            let retry = self.config.retry.clone();
            let spawned = Worker::spawn(format!("fetch-{}", id), move || {
                run_fetch_worker(id, ctx, fetcher, retry)
            });
            self.keep_or_unwind(spawned, &mut workers)?;
        }

        for id in 0..self.config.parse_workers {
            let ctx = Arc::clone(&self.ctx);
            let extractor = Arc::clone(&self.extractor);
            let destination = Arc::clone(&destination);
            let spawned = Worker::spawn(format!("parse-{}", id), move || {
                run_parse_worker(id, ctx, extractor, destination)
            });
            self.keep_or_unwind(spawned, &mut workers)?;
        }

        Ok(workers)
    }

    // On a spawn failure, stop and join whatever already started
    fn keep_or_unwind(
        &self,
        spawned: Result<Worker, CrawlError>,
        workers: &mut Vec<Worker>,
    ) -> Result<(), CrawlError> {
        match spawned {
            Ok(worker) => {
                workers.push(worker);
                Ok(())
            }
            Err(err) => {
                self.ctx.shutdown.stop();
                if let Err(join_err) = join_all(std::mem::take(workers)) {
                    warn!(error = %join_err, "worker failed while unwinding");
                }
                Err(err)
            }
        }
    }
}

// Joins every worker even if one of them panicked; reports the first panic
fn join_all(workers: Vec<Worker>) -> Result<(), CrawlError> {
    let mut first_error = None;
    for worker in workers {
        if let Err(err) = worker.join() {
            warn!(error = %err, "worker did not exit cleanly");
            first_error.get_or_insert(err);
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run() take `self` and not `&self`?
//    - The queues and frontier belong to one run only
//    - Taking ownership means nobody can call run() twice on the same
//      Crawler: the compiler refuses the second call
//
// 2. What is Arc<dyn PageFetcher>?
//    - dyn PageFetcher: "some type implementing PageFetcher", chosen at runtime
//      (HttpFetcher in the CLI, GraphFetcher in the tests)
//    - Arc: shared ownership across threads; each worker holds a clone
//
// 3. What does JoinHandle::join() return?
//    - Ok(value) if the thread finished normally
//    - Err(panic payload) if the thread panicked
// -----------------------------------------------------------------------------
