// src/crawl/mod.rs
// =============================================================================
// This module is the concurrent crawl engine.
//
// Pipeline:
//
//   [source] -> fetch queue -> fetch workers -> parse queue -> parse workers
//                   ^                                               |
//                   +------------- new (path + link) ---------------+
//
// - queue: blocking FIFO with broadcast cancel
// - frontier: "have we scheduled this link yet?" (atomic claim)
// - path: the immutable chain of links carried through both queues
// - fetch_stage / parse_stage: the two worker loops
// - shutdown: one stop signal + the set-once result
// - tracker: notices when the crawl has run out of work
// - engine: the Crawler that ties it together
// =============================================================================

mod context;
mod engine;
mod fetch_stage;
mod frontier;
mod parse_stage;
mod path;
mod queue;
mod retry;
mod shutdown;
mod stats;
mod tracker;

#[cfg(test)]
mod test_support;

pub use engine::{AbortHandle, CrawlReport, Crawler};
pub use retry::RetryPolicy;
pub use shutdown::CrawlOutcome;
