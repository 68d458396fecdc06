// src/matcher/mod.rs
// =============================================================================
// This module scans page bodies for the target pattern.
//
// Submodules:
// - pattern: the PatternMatcher, match modes and the MatchRecord type
//
// The pattern itself is configuration (a regex from the command line),
// not code - the matcher just applies whatever it was given.
// =============================================================================

mod pattern;

// Re-export the matching API
pub use pattern::{MatchMode, MatchRecord, PatternMatcher};
