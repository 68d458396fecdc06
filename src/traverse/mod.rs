// src/traverse/mod.rs
// =============================================================================
// This module is the traversal engine - the heart of the tool.
//
// Submodules:
// - scope: the Origin type and the in-scope check
// - frontier: pending-work collection (single slot or stack) + visited set
// - engine: the Traversal state machine that ties fetch, match and
//   extract together, one step per page
//
// Everything the engine touches is owned by it and mutated only through
// its step() method, so the whole state machine can be driven and
// inspected from tests.
// =============================================================================

mod engine;
mod frontier;
mod scope;

// Re-export the engine's public API
pub use engine::{LimitPolicy, Report, StopReason, Traversal, TraversalConfig, TraversalMode};
pub use frontier::{Frontier, Visited};
pub use scope::Origin;
