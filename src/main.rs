// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the traversal (start address, matcher, transport, config)
// 3. Run it to completion and print the report
// 4. Exit with proper code (0 = found, 1 = not found, 2 = error)
//
// Rust concepts used:
// - async/await: The traversal awaits one fetch at a time
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;      // src/cli.rs - command-line parsing
mod extract;  // src/extract/ - link extraction from page bodies
mod fetch;    // src/fetch/ - HTTP transport
mod matcher;  // src/matcher/ - target pattern scanning
mod traverse; // src/traverse/ - the traversal state machine

// Import items we need from our modules
use cli::{Cli, Commands, CommonOpts};
use clap::Parser; // Parser trait enables the parse() method

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::{anyhow, Context, Result};
use regex::RegexBuilder;
use url::Url;

use fetch::{FetchConfig, HttpFetcher};
use matcher::{MatchMode, PatternMatcher};
use traverse::{LimitPolicy, Report, Traversal, TraversalConfig, TraversalMode};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
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

// This is the main application logic
// Returns:
//   Ok(0) = target pattern found
//   Ok(1) = not found (exhausted, out of scope, loop, or limit)
//   Err = unexpected error (bad arguments, fatal transport failure)
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // Each subcommand only differs in its TraversalMode
    let (start, mode, common) = match cli.command {
        Commands::Chain {
            start,
            next_pattern,
            common,
        } => {
            let next_page = RegexBuilder::new(&next_pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Invalid next-page pattern '{}'", next_pattern))?;
            (start, TraversalMode::Chain { next_page }, common)
        }
        Commands::Dfs { start, common } => (start, TraversalMode::Dfs, common),
    };

    let start_url = resolve_start(&start, common.base.as_deref())?;

    println!("🔍 Hunting for /{}/ from {}", common.pattern, start_url);

    let matcher = PatternMatcher::new(&common.pattern, Some(&common.hint))?;

    let fetcher = HttpFetcher::new(&FetchConfig {
        timeout_secs: common.timeout,
        proxy: common.proxy.clone(),
        insecure: common.insecure,
    })?;

    let config = TraversalConfig {
        mode,
        match_mode: if common.all {
            MatchMode::All
        } else {
            MatchMode::First
        },
        limit_policy: if common.count_attempts {
            LimitPolicy::Attempts
        } else {
            LimitPolicy::Successes
        },
        max_pages: common.max,
        delay_ms: common.delay,
    };

    let traversal = Traversal::new(&start_url, fetcher, matcher, config)?;
    println!("📍 Scope: {}\n", traversal.origin());

    let report = traversal.run().await?;

    print_report(&report, &common)?;

    if report.found() {
        Ok(0) // Exit code 0 = target found
    } else {
        Ok(1) // Exit code 1 = hunt came up empty
    }
}

// Turns the start argument into a full URL
//
// A full URL is used as-is; a bare path needs --base to join against.
fn resolve_start(start: &str, base: Option<&str>) -> Result<String> {
    if start.starts_with("http://") || start.starts_with("https://") {
        return Ok(start.to_string());
    }

    let base = base.ok_or_else(|| {
        anyhow!("Start '{}' is not a full URL; pass --base to join it against", start)
    })?;

    let joined = Url::parse(base)
        .with_context(|| format!("Invalid base URL '{}'", base))?
        .join(start)
        .with_context(|| format!("Cannot join '{}' against '{}'", start, base))?;

    Ok(joined.to_string())
}

// Prints the final report either as text or JSON
fn print_report(report: &Report, common: &CommonOpts) -> Result<()> {
    if common.json {
        // Serialize the whole report to JSON and print
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
        return Ok(());
    }

    println!();
    if report.found() {
        println!("✅ Found {} match(es) after {} page(s):", report.matches.len(), report.pages_fetched);
        for record in &report.matches {
            println!("   {}  ({})", record.text, record.address);
        }
    } else {
        println!("❌ Not found: {}", report.reason);
        println!("   Pages fetched: {}", report.pages_fetched);
    }

    Ok(())
}
