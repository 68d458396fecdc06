// src/extract/mod.rs
// =============================================================================
// This module extracts outbound links from fetched pages.
//
// Submodules:
// - links: markup detection, href harvesting, relative-URL resolution
//
// The extractor is purely syntactic: it never touches the network and
// never decides scope - that is the traversal engine's job.
// =============================================================================

mod links;

// Re-export the extraction API
pub use links::{extract_links, looks_like_markup};
