// src/crawl/fetch_stage.rs
// =============================================================================
// The fetch stage: workers that download pages.
//
// Each worker loops:
//   WAIT_WORK -> pop a PathItem from the fetch queue (None = shut down)
//   FETCHING  -> download path.last(), retrying transient failures with
//                backoff; the stop signal is checked before every attempt
//                and the backoff sleep wakes up early on shutdown
//   FORWARD   -> push (path, body) onto the parse queue
//
// A page that fails permanently, or runs out of retries, is dropped: the
// crawl simply doesn't explore past it.
// =============================================================================

use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::context::{CrawlContext, ParseJob};
use super::retry::RetryPolicy;
use crate::error::FetchError;
use crate::fetch::PageFetcher;

enum FetchAttempt {
    Body(Vec<u8>),
    GaveUp(FetchError),
    Stopped,
}

pub(crate) fn run_fetch_worker(
    id: usize,
    ctx: Arc<CrawlContext>,
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
) {
    debug!(worker = id, "fetch worker started");

    while let Some(path) = ctx.fetch_queue.pop_blocking() {
        let _unit = ctx.begin_unit();
        trace!(worker = id, url = path.last(), depth = path.hops(), "fetching");

        match fetch_with_retry(id, &ctx, fetcher.as_ref(), &retry, path.last()) {
            FetchAttempt::Body(body) => {
                // Nothing is forwarded once the run is over
                if ctx.shutdown.is_stopped() {
                    break;
                }
                ctx.stats.record_fetch();
                ctx.schedule_parse(ParseJob { path, body });
            }
            FetchAttempt::GaveUp(err) => {
                ctx.stats.record_failure();
                warn!(worker = id, url = path.last(), error = %err, "dropping page");
            }
            FetchAttempt::Stopped => break,
        }
    }

    debug!(worker = id, "fetch worker stopped");
}

fn fetch_with_retry(
    id: usize,
    ctx: &CrawlContext,
    fetcher: &dyn PageFetcher,
    retry: &RetryPolicy,
    target: &str,
) -> FetchAttempt {
    let mut retries = 0;

    loop {
        if ctx.shutdown.is_stopped() {
            return FetchAttempt::Stopped;
        }

        match fetcher.fetch(target) {
            Ok(body) => return FetchAttempt::Body(body),
            Err(err) if err.is_transient() && retries < retry.max_retries => {
                retries += 1;
                ctx.stats.record_retry();
                debug!(worker = id, url = target, attempt = retries, error = %err, "retrying");

                if ctx.shutdown.sleep(retry.backoff(retries)) {
                    return FetchAttempt::Stopped;
                }
            }
            Err(err) => return FetchAttempt::GaveUp(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::path::PathItem;
    use crate::crawl::shutdown::CrawlOutcome;
    use crate::crawl::test_support::{wait_until, GraphFetcher};
    use std::thread;
    use std::time::{Duration, Instant};

    fn spawn_worker(
        ctx: &Arc<CrawlContext>,
        fetcher: &Arc<GraphFetcher>,
        retry: RetryPolicy,
    ) -> thread::JoinHandle<()> {
        let ctx = Arc::clone(ctx);
        let fetcher = Arc::clone(fetcher) as Arc<dyn PageFetcher>;
        thread::spawn(move || run_fetch_worker(0, ctx, fetcher, retry))
    }

    fn transient() -> FetchError {
        FetchError::Transient("connection reset".to_string())
    }

    #[test]
    fn test_retries_then_forwards_once() {
        let fetcher = Arc::new(GraphFetcher::new(&[("/A", &["/B"])]).fail("/A", 2, transient()));
        let ctx = Arc::new(CrawlContext::new());
        ctx.schedule_fetch(PathItem::root("/A"));

        let worker = spawn_worker(&ctx, &fetcher, RetryPolicy::immediate(3));

        assert!(wait_until(|| ctx.parse_queue.len() == 1));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ctx.parse_queue.len(), 1);

        let job = ctx.parse_queue.try_pop().unwrap();
        assert_eq!(job.path, PathItem::root("/A"));
        assert_eq!(job.body, b"/B".to_vec());

        ctx.shutdown.stop();
        worker.join().unwrap();

        assert_eq!(fetcher.fetch_count("/A"), 3);
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.fetch_retries, 2);
        assert_eq!(stats.pages_fetched, 1);
    }

    #[test]
    fn test_permanent_error_is_not_retried() {
        let fetcher = Arc::new(
            GraphFetcher::new(&[("/A", &["/B"])])
                .fail("/A", 1, FetchError::Permanent("HTTP 404".to_string())),
        );
        let ctx = Arc::new(CrawlContext::new());
        ctx.schedule_fetch(PathItem::root("/A"));

        let worker = spawn_worker(&ctx, &fetcher, RetryPolicy::immediate(5));

        // Dropping the only page drains the crawl
        assert_eq!(ctx.shutdown.wait(), CrawlOutcome::Exhausted);
        worker.join().unwrap();

        assert_eq!(fetcher.fetch_count("/A"), 1);
        assert_eq!(ctx.stats.snapshot().fetch_failures, 1);
    }

    #[test]
    fn test_gives_up_after_retry_budget() {
        let fetcher = Arc::new(GraphFetcher::new(&[("/A", &[])]).fail("/A", 10, transient()));
        let ctx = Arc::new(CrawlContext::new());
        ctx.schedule_fetch(PathItem::root("/A"));

        let worker = spawn_worker(&ctx, &fetcher, RetryPolicy::immediate(2));

        assert_eq!(ctx.shutdown.wait(), CrawlOutcome::Exhausted);
        worker.join().unwrap();

        assert_eq!(fetcher.fetch_count("/A"), 3);
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.fetch_retries, 2);
        assert_eq!(stats.fetch_failures, 1);
    }

    #[test]
    fn test_stop_interrupts_backoff() {
        let fetcher = Arc::new(GraphFetcher::new(&[("/A", &["/B"])]).fail("/A", 1, transient()));
        let ctx = Arc::new(CrawlContext::new());
        ctx.schedule_fetch(PathItem::root("/A"));

        let slow_retry = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_secs(60),
            max_backoff: Duration::from_secs(60),
            multiplier: 1.0,
        };
        let worker = spawn_worker(&ctx, &fetcher, slow_retry);

        assert!(wait_until(|| fetcher.fetch_count("/A") == 1));
        let started = Instant::now();
        ctx.shutdown.stop();
        worker.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(fetcher.fetch_count("/A"), 1);
        assert_eq!(ctx.stats.snapshot().pages_fetched, 0);
    }
}
