// src/fetch/mod.rs
// =============================================================================
// This module is the HTTP transport boundary.
//
// Submodules:
// - client: the Fetcher trait, the Page response type, and the real
//   reqwest-backed implementation
//
// Why a trait?
// - The traversal engine only cares about "give me the page at this URL"
// - Putting that behind a trait lets tests drive the engine with an
//   in-memory fake instead of a live web server
//
// Rust concepts:
// - Traits: Define shared behavior (like interfaces)
// - async-trait: Allows async methods in traits
// =============================================================================

mod client;

// Re-export the public transport API
pub use client::{FetchConfig, Fetcher, HttpFetcher, Page};
