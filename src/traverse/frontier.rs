// src/traverse/frontier.rs
// =============================================================================
// This module holds the traversal's pending work and its memory.
//
// Frontier comes in two disciplines:
// - Single: holds at most one address - the chain crawler's "the next
//   page is exactly this one"
// - Stack: LIFO, giving depth-first exploration of a branching graph
//
// Visited is an insert-only set: once an address goes in it never comes
// out, and an address already present is never fetched again.
//
// Rust concepts:
// - Enums with data: One type, two disciplines
// - HashSet: O(1) membership checks for the visited set
// =============================================================================

use std::collections::HashSet;

// Pending addresses awaiting a fetch attempt
#[derive(Debug)]
pub enum Frontier {
    /// At most one pending address (chain traversal)
    Single(Option<String>),
    /// LIFO stack (depth-first traversal)
    Stack(Vec<String>),
}

impl Frontier {
    // Seeds a single-slot frontier with the start address
    pub fn seeded_single(start: String) -> Self {
        Frontier::Single(Some(start))
    }

    // Seeds a stack frontier with the start address
    pub fn seeded_stack(start: String) -> Self {
        Frontier::Stack(vec![start])
    }

    // Takes the next address to fetch, or None when exhausted
    pub fn pop(&mut self) -> Option<String> {
        match self {
            Frontier::Single(slot) => slot.take(),
            Frontier::Stack(stack) => stack.pop(),
        }
    }

    // Adds a discovered address
    //
    // In single mode the slot is overwritten (there is only ever one
    // successor); in stack mode the address goes on top.
    pub fn push(&mut self, addr: String) {
        match self {
            Frontier::Single(slot) => *slot = Some(addr),
            Frontier::Stack(stack) => stack.push(addr),
        }
    }

}

// Addresses we have already attempted to fetch
#[derive(Debug, Default)]
pub struct Visited {
    set: HashSet<String>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.set.contains(addr)
    }

    // Records an address; returns false if it was already known
    pub fn insert(&mut self, addr: String) -> bool {
        self.set.insert(addr)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }
}
