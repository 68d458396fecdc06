// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The two subcommands map to the two traversal disciplines:
// - chain: follow exactly one chosen link per page
// - dfs:   explore every in-scope link depth-first
// =============================================================================

use clap::{Args, Parser, Subcommand};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "linkhound",
    version = "0.1.0",
    about = "Traverse a website's link graph hunting for a target pattern",
    long_about = "linkhound fetches pages starting from one address, follows their links \
                  inside the start address's authority, and scans every body for a target \
                  regex until it finds one (or proves it can't)."
)]
pub struct Cli {
    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (chain, dfs)
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow a single chosen link per page (a chain of pages)
    ///
    /// Example: linkhound chain /pages/page-1-start.html --base http://maze.test:8031
    Chain {
        /// Start address: a full URL, or a path joined against --base
        start: String,

        /// Regex a link must match to be preferred as the next page;
        /// falls back to the first link on the page otherwise
        #[arg(long, default_value = r"page-\d+[-_A-Za-z0-9]*\.html?$")]
        next_pattern: String,

        #[command(flatten)]
        common: CommonOpts,
    },

    /// Explore every in-scope link depth-first
    ///
    /// Example: linkhound dfs http://maze.test:8031/round2/ --all
    Dfs {
        /// Start address: a full URL, or a path joined against --base
        start: String,

        #[command(flatten)]
        common: CommonOpts,
    },
}

// Flags shared by both traversal modes
//
// #[derive(Args)] + #[command(flatten)] keeps them defined once
#[derive(Args, Debug)]
pub struct CommonOpts {
    /// Base URL a relative start path is joined against
    #[arg(long)]
    pub base: Option<String>,

    /// Target pattern to hunt for (case-insensitive regex)
    #[arg(long, default_value = r"FLAG\{[^}]+\}")]
    pub pattern: String,

    /// Bare keyword whose presence is reported as an advisory hint
    /// when the strict pattern doesn't match
    #[arg(long, default_value = "flag")]
    pub hint: String,

    /// Collect every distinct match instead of stopping at the first
    #[arg(long)]
    pub all: bool,

    /// Hard cap on pages (a safety bound against cyclic graphs)
    #[arg(long, default_value_t = 500)]
    pub max: usize,

    /// Count failed fetch attempts against --max too, not only
    /// successful fetches
    #[arg(long)]
    pub count_attempts: bool,

    /// Delay between requests, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,

    /// Upstream proxy URL (e.g. http://127.0.0.1:8080 for Burp)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Disable TLS certificate verification (useful behind an
    /// intercepting proxy)
    #[arg(long)]
    pub insecure: bool,

    /// Output the final report in JSON format instead of text
    #[arg(long)]
    pub json: bool,
}
