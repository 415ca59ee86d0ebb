// src/crawl/parse_stage.rs
// =============================================================================
// The parse stage: workers that turn fetched pages into new work.
//
// Each worker pops a (path, body) job, asks the extractor for the links on
// the page and walks them in order:
//   1. link == destination -> report path + link, stop the whole crawl and
//      ignore the rest of this page
//   2. frontier.try_claim(link) wins -> schedule path + link for fetching
//   3. otherwise someone already scheduled it -> skip
//
// A page is always processed to the end (or to a destination hit); the
// stop signal is only looked at between jobs.
// =============================================================================

use std::sync::Arc;
use tracing::{debug, info, trace};

use super::context::CrawlContext;
use super::shutdown::CrawlOutcome;
use crate::extract::LinkExtractor;

pub(crate) fn run_parse_worker(
    id: usize,
    ctx: Arc<CrawlContext>,
    extractor: Arc<dyn LinkExtractor>,
    destination: Arc<str>,
) {
    debug!(worker = id, "parse worker started");

    while let Some(job) = ctx.parse_queue.pop_blocking() {
        let _unit = ctx.begin_unit();

        let links = extractor.extract(&job.body);
        ctx.stats.record_parse(links.len());
        trace!(worker = id, url = job.path.last(), links = links.len(), "parsed");

        for link in links {
            if *link == *destination {
                let path = job.path.extend(link);
                if ctx.shutdown.finish(CrawlOutcome::Found { path: path.clone() }) {
                    info!(worker = id, hops = path.hops(), "destination found");
                }
                break;
            }

            if ctx.frontier.try_claim(&link) {
                ctx.stats.record_claim();
                ctx.schedule_fetch(job.path.extend(link));
            }
        }
    }

    debug!(worker = id, "parse worker stopped");
}
