// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap (usage errors exit here)
// 2. Set up logging (tracing, to stderr)
// 3. Build the fetcher + extractor and run the crawl on a blocking thread
// 4. Turn Ctrl-C into a clean abort of the crawl
// 5. Print the result and exit with the proper code
//    (0 = path found, 1 = no path / aborted, 2 = error)
//
// Rust concepts used:
// - async/await: main waits for the crawl and for Ctrl-C at the same time
// - spawn_blocking: the crawler uses OS threads and blocking I/O, so it
//   must not run on the async executor itself
// - Result<T, E>: For error handling
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - crawl/fetcher settings
mod crawl;         // src/crawl/ - the concurrent crawl engine
mod error;         // src/error.rs - typed errors
mod extract;       // src/extract/ - link extraction from HTML
mod fetch;         // src/fetch/ - page downloads over HTTP

use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use anyhow::{Context, Result};
use crawl::{AbortHandle, CrawlOutcome, CrawlReport, Crawler};
use extract::HtmlLinkExtractor;
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = cli.source().to_string();
    let destination = cli.destination().to_string();

    if !cli.json {
        println!("🔍 Searching for a path from {} to {}", source, destination);
    }

    // The crawler (and reqwest's blocking client inside it) is built, run
    // and dropped on a blocking thread. Its abort handle is sent back here.
    let (handle_tx, handle_rx) = tokio::sync::oneshot::channel::<AbortHandle>();
    let settings = (cli.crawl_config(), cli.fetcher_config(), cli.link_prefix.clone());

    let mut crawl_task = tokio::task::spawn_blocking(move || -> Result<CrawlReport> {
        let (crawl_config, fetcher_config, link_prefix) = settings;

        let fetcher = HttpFetcher::new(&fetcher_config)?;
        let extractor = HtmlLinkExtractor::new(link_prefix)?;
        let crawler = Crawler::new(crawl_config, Arc::new(fetcher), Arc::new(extractor))?;

        // The receiver only goes away if main is already exiting
        let _ = handle_tx.send(crawler.abort_handle());

        Ok(crawler.run(&source, &destination)?)
    });

    let report = tokio::select! {
        joined = &mut crawl_task => joined,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("⏹️  Interrupted, stopping workers...");
            if let Ok(handle) = handle_rx.await {
                handle.abort();
            }
            crawl_task.await
        }
    }
    .context("crawl thread panicked")??;

    print_report(&report, cli.json)?;

    Ok(match report.outcome {
        CrawlOutcome::Found { .. } => 0,
        CrawlOutcome::Exhausted | CrawlOutcome::Cancelled => 1,
    })
}

// Logs go to stderr so stdout only carries the result.
// RUST_LOG wins over --verbose when it is set.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "wikirace=debug,warn"
    } else {
        "wikirace=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .init();
}

// Prints the report either as human-readable text or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
        return Ok(());
    }

    match &report.outcome {
        CrawlOutcome::Found { path } => {
            println!("✅ Found a path with {} hop(s):", path.hops());
            for (i, link) in path.segments().iter().enumerate() {
                println!("   {:>2}. {}", i + 1, link);
            }
        }
        CrawlOutcome::Exhausted => {
            println!(
                "❌ No path: every page reachable from {} was explored",
                report.source
            );
        }
        CrawlOutcome::Cancelled => {
            println!("⚠️  Crawl cancelled before a path was found");
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages fetched: {}", report.stats.pages_fetched);
    println!("   🔗 Links seen: {}", report.stats.links_seen);
    println!("   🔁 Retries: {}", report.stats.fetch_retries);
    println!("   ❌ Failed pages: {}", report.stats.fetch_failures);
    println!("   ⏱️  Elapsed: {:.2?}", report.elapsed);
    Ok(())
}
