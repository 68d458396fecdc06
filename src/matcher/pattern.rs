// src/matcher/pattern.rs
// =============================================================================
// This module applies the target pattern to page text.
//
// Two modes:
// - First: return the first occurrence and nothing else (the traversal
//   stops as soon as one is found)
// - All: return every non-overlapping occurrence in document order (the
//   traversal keeps going; the engine de-duplicates across pages)
//
// There is also a deliberately loose secondary check: "does the text at
// least contain the bare keyword?". That is a human-readable hint only -
// it never satisfies the real contract and never changes control flow.
//
// Rust concepts:
// - RegexBuilder: To compile a user-supplied pattern case-insensitively
// - Serde derives: MatchRecord ends up in the --json report
// =============================================================================

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

// Whether to stop at the first occurrence or sweep the whole page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    First,
    All,
}

// One located occurrence of the target pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The literal text the pattern matched
    pub text: String,
    /// The address of the page it was found on
    pub address: String,
}

// Compiled target pattern plus the optional keyword hint
pub struct PatternMatcher {
    regex: Regex,
    hint: Option<Regex>,
}

impl PatternMatcher {
    // Compiles the target pattern (case-insensitive) and, if a keyword
    // was given, a word-boundary hint expression for it
    pub fn new(pattern: &str, hint_keyword: Option<&str>) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid target pattern '{}'", pattern))?;

        let hint = match hint_keyword {
            Some(keyword) => {
                let expr = format!(r"\b{}\b", regex::escape(keyword));
                let rx = RegexBuilder::new(&expr)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("Invalid hint keyword '{}'", keyword))?;
                Some(rx)
            }
            None => None,
        };

        Ok(Self { regex, hint })
    }

    // Scans one page's text for the target pattern
    //
    // Parameters:
    //   text: the page body
    //   address: the page's address, stamped into each MatchRecord
    //   mode: First (at most one record) or All (every occurrence)
    //
    // Duplicate texts within a page are suppressed here; duplicates
    // across pages are the traversal engine's business.
    pub fn scan(&self, text: &str, address: &str, mode: MatchMode) -> Vec<MatchRecord> {
        match mode {
            MatchMode::First => self
                .regex
                .find(text)
                .map(|m| {
                    vec![MatchRecord {
                        text: m.as_str().to_string(),
                        address: address.to_string(),
                    }]
                })
                .unwrap_or_default(),
            MatchMode::All => {
                let mut records: Vec<MatchRecord> = Vec::new();
                for m in self.regex.find_iter(text) {
                    if records.iter().any(|r| r.text == m.as_str()) {
                        continue;
                    }
                    records.push(MatchRecord {
                        text: m.as_str().to_string(),
                        address: address.to_string(),
                    });
                }
                records
            }
        }
    }

    // The advisory check: true if the bare keyword appears anywhere.
    // Worth a look by a human, worth nothing to the state machine.
    pub fn has_hint(&self, text: &str) -> bool {
        self.hint.as_ref().is_some_and(|rx| rx.is_match(text))
    }
}
