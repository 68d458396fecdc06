// src/traverse/engine.rs
// =============================================================================
// This module implements the traversal state machine.
//
// One step, while running:
// 1. Pop the next address from the frontier (empty -> EXHAUSTED)
// 2. Already visited? chain mode -> LOOP, dfs mode -> silently discard
// 3. (dfs only) Out of scope? silently discard
// 4. Mark visited, fetch. Transport failure is fatal in chain mode,
//    a skip-with-warning in dfs mode
// 5. Count the page; at the limit -> LIMIT
// 6. Scan for the target pattern. First mode stops on a hit (FOUND);
//    All mode records new texts and keeps going
// 7. Extract links. Chain mode picks exactly one successor (next-page
//    shape preferred, else the first link; none -> EXHAUSTED, out of
//    scope -> OUT_OF_SCOPE). Dfs mode pushes every in-scope unvisited
//    link in reverse order, so document order is explored first
// 8. Optional courtesy delay, then loop
//
// The mode asymmetries are deliberate: a chain is a single thread of
// progress, so a revisit, a dead end or a scope escape proves the hunt
// failed; a branching graph just moves on to the next branch.
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use super::frontier::{Frontier, Visited};
use super::scope::Origin;
use crate::extract::extract_links;
use crate::fetch::Fetcher;
use crate::matcher::{MatchMode, MatchRecord, PatternMatcher};

// Why the traversal stopped
//
// Serialized into the --json report with a "reason" tag, same shape as
// the match records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// First-match mode located the target pattern
    Found,
    /// The frontier ran dry (chain: dead-end page; dfs: graph exhausted)
    Exhausted,
    /// Chain mode: the chosen successor left the origin
    OutOfScope { address: String },
    /// Chain mode: the next address was already visited - no progress possible
    LoopDetected { address: String },
    /// The configured page limit was hit (safety bound, not a bug)
    LimitReached,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Found => write!(f, "target pattern found"),
            StopReason::Exhausted => write!(f, "frontier exhausted, no further links to follow"),
            StopReason::OutOfScope { address } => {
                write!(f, "next address out of scope: {}", address)
            }
            StopReason::LoopDetected { address } => write!(f, "loop detected at {}", address),
            StopReason::LimitReached => write!(f, "page limit reached"),
        }
    }
}

// Which traversal discipline to run
#[derive(Debug, Clone)]
pub enum TraversalMode {
    /// Single-successor: follow exactly one chosen link per page.
    /// Links matching next_page are preferred over the first link.
    Chain { next_page: Regex },
    /// Multi-successor: depth-first over every in-scope link
    Dfs,
}

impl TraversalMode {
    fn is_chain(&self) -> bool {
        matches!(self, TraversalMode::Chain { .. })
    }
}

// What the page limit counts
//
// The distinction only shows when fetches fail: an unreachable page is
// an attempt but not a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitPolicy {
    /// Count successful fetches (default)
    Successes,
    /// Count every fetch attempt, failed ones included
    Attempts,
}

// Knobs for one traversal run
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    pub mode: TraversalMode,
    pub match_mode: MatchMode,
    pub limit_policy: LimitPolicy,
    /// Hard cap on pages, enforced regardless of mode
    pub max_pages: usize,
    /// Courtesy pause between requests, milliseconds
    pub delay_ms: u64,
}

// The final outcome of a run
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub reason: StopReason,
    pub matches: Vec<MatchRecord>,
    pub pages_fetched: usize,
    /// Distinct addresses a fetch was attempted for; in dfs mode this
    /// can exceed pages_fetched when some fetches failed
    pub addresses_visited: usize,
}

impl Report {
    /// A run succeeded if it produced at least one match record
    pub fn found(&self) -> bool {
        !self.matches.is_empty()
    }
}

// The traversal controller
//
// Owns the frontier, the visited set and the accumulated matches;
// nothing outside step() mutates them.
pub struct Traversal<F: Fetcher> {
    fetcher: F,
    matcher: PatternMatcher,
    origin: Origin,
    config: TraversalConfig,
    frontier: Frontier,
    visited: Visited,
    matches: Vec<MatchRecord>,
    seen_texts: HashSet<String>,
    pages_fetched: usize,
    attempts: usize,
}

impl<F: Fetcher> Traversal<F> {
    // Sets up a run: normalizes the start address (fragment stripped,
    // same canonical form the extractor produces), derives the origin
    // from it and seeds the frontier.
    pub fn new(
        start_url: &str,
        fetcher: F,
        matcher: PatternMatcher,
        config: TraversalConfig,
    ) -> Result<Self> {
        let mut start = Url::parse(start_url)
            .with_context(|| format!("Invalid start URL '{}'", start_url))?;
        start.set_fragment(None);

        let origin = Origin::from_url(&start)?;
        let start = start.to_string();

        let frontier = if config.mode.is_chain() {
            Frontier::seeded_single(start)
        } else {
            Frontier::seeded_stack(start)
        };

        Ok(Self {
            fetcher,
            matcher,
            origin,
            config,
            frontier,
            visited: Visited::new(),
            matches: Vec::new(),
            seen_texts: HashSet::new(),
            pages_fetched: 0,
            attempts: 0,
        })
    }

    /// The crawl scope, fixed for the lifetime of the run
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Successful fetches so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Distinct addresses a fetch was attempted for
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    // Runs the state machine to completion
    pub async fn run(mut self) -> Result<Report> {
        loop {
            if let Some(reason) = self.step().await? {
                let pages_fetched = self.pages_fetched();
                let addresses_visited = self.visited_count();
                return Ok(Report {
                    reason,
                    matches: self.matches,
                    pages_fetched,
                    addresses_visited,
                });
            }
        }
    }

    // Executes one step of the state machine
    //
    // Returns Ok(Some(reason)) on a terminal state, Ok(None) to keep
    // going. Err is a fatal transport failure (chain mode only).
    pub async fn step(&mut self) -> Result<Option<StopReason>> {
        let addr = match self.frontier.pop() {
            Some(addr) => addr,
            None => return Ok(Some(StopReason::Exhausted)),
        };

        if self.visited.contains(&addr) {
            if self.config.mode.is_chain() {
                // Revisiting on a chain proves no progress is possible
                return Ok(Some(StopReason::LoopDetected { address: addr }));
            }
            // The stack can hold duplicates; drop them silently,
            // the page counter untouched
            return Ok(None);
        }

        if !self.config.mode.is_chain() && !self.origin.in_scope(&addr) {
            return Ok(None);
        }

        self.visited.insert(addr.clone());
        self.attempts += 1;

        let page = match self.fetcher.get(&addr).await {
            Ok(page) => page,
            Err(e) => {
                if self.config.mode.is_chain() {
                    // A chain has no other branch to fall back on
                    return Err(e);
                }
                eprintln!("  Warning: {}", e);
                if self.limit_hit() {
                    return Ok(Some(StopReason::LimitReached));
                }
                return Ok(None);
            }
        };

        self.pages_fetched += 1;
        println!("[{:03}] {} {}", self.pages_fetched, page.status, addr);

        let records = self.matcher.scan(&page.body, &addr, self.config.match_mode);
        if records.is_empty() && self.matcher.has_hint(&page.body) {
            // Advisory only - a human should eyeball this page
            println!("  [!] keyword hint (no strict match) on {}", addr);
        }

        match self.config.match_mode {
            MatchMode::First => {
                if let Some(record) = records.into_iter().next() {
                    self.matches.push(record);
                    return Ok(Some(StopReason::Found));
                }
            }
            MatchMode::All => {
                // Identical texts found on later pages are not new finds
                for record in records {
                    if self.seen_texts.insert(record.text.clone()) {
                        self.matches.push(record);
                    }
                }
            }
        }

        if self.limit_hit() {
            return Ok(Some(StopReason::LimitReached));
        }

        // Resolve against where the redirect chain actually landed us
        let links = extract_links(&page.body, page.content_type.as_deref(), &page.final_url);

        match &self.config.mode {
            TraversalMode::Chain { next_page } => {
                // Ranked choice: a next-page-shaped link beats document order
                let chosen = links
                    .iter()
                    .find(|link| next_page.is_match(link))
                    .or_else(|| links.first());

                let chosen = match chosen {
                    Some(link) => link.clone(),
                    None => return Ok(Some(StopReason::Exhausted)),
                };

                if !self.origin.in_scope(&chosen) {
                    return Ok(Some(StopReason::OutOfScope { address: chosen }));
                }

                self.frontier.push(chosen);
            }
            TraversalMode::Dfs => {
                // Reverse push order, so the first-extracted link is on
                // top of the stack and explored first
                for link in links.into_iter().rev() {
                    if self.origin.in_scope(&link) && !self.visited.contains(&link) {
                        self.frontier.push(link);
                    }
                }
            }
        }

        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        Ok(None)
    }

    // Checks the hard page cap under the configured counting policy
    fn limit_hit(&self) -> bool {
        let counted = match self.config.limit_policy {
            LimitPolicy::Successes => self.pages_fetched,
            LimitPolicy::Attempts => self.attempts,
        };
        counted >= self.config.max_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Page;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;

    // Serves pages straight from a HashMap; anything missing is a
    // connection failure
    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn get(&self, url: &str) -> Result<Page> {
            match self.pages.get(url) {
                Some(body) => Ok(Page {
                    status: 200,
                    final_url: url.to_string(),
                    content_type: Some("text/html".to_string()),
                    body: body.clone(),
                }),
                None => Err(anyhow!("connection refused: {}", url)),
            }
        }
    }

    fn matcher() -> PatternMatcher {
        PatternMatcher::new(r"TARGET\{[^}]+\}", Some("target")).unwrap()
    }

    fn chain_config(match_mode: MatchMode, max_pages: usize) -> TraversalConfig {
        TraversalConfig {
            mode: TraversalMode::Chain {
                next_page: Regex::new(r"page-\d+[-_A-Za-z0-9]*\.html?$").unwrap(),
            },
            match_mode,
            limit_policy: LimitPolicy::Successes,
            max_pages,
            delay_ms: 0,
        }
    }

    fn dfs_config(match_mode: MatchMode, max_pages: usize) -> TraversalConfig {
        TraversalConfig {
            mode: TraversalMode::Dfs,
            match_mode,
            limit_policy: LimitPolicy::Successes,
            max_pages,
            delay_ms: 0,
        }
    }

    fn link(href: &str) -> String {
        format!(r#"<html><body><a href="{}">go</a></body></html>"#, href)
    }

    #[tokio::test]
    async fn test_chain_follows_to_the_target() {
        // Scenario: a three-page chain ending in a match
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/pages/page-1-start.html", &link("page-2-x.html")),
            ("http://maze.test/pages/page-2-x.html", &link("page-3-y.html")),
            ("http://maze.test/pages/page-3-y.html", "<html>TARGET{abc}</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/pages/page-1-start.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::Found);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].text, "TARGET{abc}");
        assert_eq!(report.matches[0].address, "http://maze.test/pages/page-3-y.html");
    }

    #[tokio::test]
    async fn test_chain_prefers_next_page_shaped_link() {
        // The decoy comes first in document order but doesn't look like
        // a next page; the ranked choice must skip it
        let start_body = r#"<html>
            <a href="decoy.html">decoy</a>
            <a href="page-2-real.html">next</a>
        </html>"#;
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/pages/page-1.html", start_body),
            ("http://maze.test/pages/page-2-real.html", "<html>TARGET{next}</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/pages/page-1.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::Found);
        assert_eq!(report.matches[0].address, "http://maze.test/pages/page-2-real.html");
    }

    #[tokio::test]
    async fn test_chain_detects_loop() {
        // Scenario: A links to B, B links back to A
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/a.html", &link("b.html")),
            ("http://maze.test/b.html", &link("a.html")),
        ]);

        let t = Traversal::new(
            "http://maze.test/a.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(
            report.reason,
            StopReason::LoopDetected {
                address: "http://maze.test/a.html".to_string()
            }
        );
        assert_eq!(report.pages_fetched, 2);
        assert!(!report.found());
    }

    #[tokio::test]
    async fn test_chain_dead_end_exhausts() {
        let fetcher = FakeFetcher::new(&[(
            "http://maze.test/a.html",
            "<html><p>no links here</p></html>",
        )]);

        let t = Traversal::new(
            "http://maze.test/a.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_chain_stops_at_scope_boundary_without_fetching() {
        let fetcher = FakeFetcher::new(&[(
            "http://maze.test/a.html",
            r#"<html><a href="http://elsewhere.test/b.html">out</a></html>"#,
        )]);

        let t = Traversal::new(
            "http://maze.test/a.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(
            report.reason,
            StopReason::OutOfScope {
                address: "http://elsewhere.test/b.html".to_string()
            }
        );
        // The out-of-scope address was identified, never fetched
        assert_eq!(report.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_chain_transport_failure_is_fatal() {
        let fetcher = FakeFetcher::new(&[(
            "http://maze.test/a.html",
            &link("missing.html"),
        )]);

        let t = Traversal::new(
            "http://maze.test/a.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        assert!(t.run().await.is_err());
    }

    #[tokio::test]
    async fn test_dfs_collects_across_branches() {
        // Scenario: start branches to X and Y; only Y holds the target
        let start_body = r#"<html>
            <a href="x.html">x</a>
            <a href="y.html">y</a>
        </html>"#;
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/start.html", start_body),
            ("http://maze.test/x.html", "<html>nothing</html>"),
            ("http://maze.test/y.html", "<html>TARGET{zzz}</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/start.html",
            fetcher,
            matcher(),
            dfs_config(MatchMode::All, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].text, "TARGET{zzz}");
        assert!(report.found());
    }

    #[tokio::test]
    async fn test_dfs_explores_document_order_first() {
        // x links deeper; with reverse pushes, x's subtree runs before y
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/start.html", r#"<html><a href="x.html">x</a><a href="y.html">y</a></html>"#),
            ("http://maze.test/x.html", &link("x2.html")),
            ("http://maze.test/x2.html", "<html>TARGET{deep}</html>"),
            ("http://maze.test/y.html", "<html>TARGET{late}</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/start.html",
            fetcher,
            matcher(),
            dfs_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::Found);
        assert_eq!(report.matches[0].text, "TARGET{deep}");
    }

    #[tokio::test]
    async fn test_dfs_dedups_identical_texts_across_pages() {
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/start.html", r#"<html>TARGET{dup}<a href="b.html">b</a></html>"#),
            ("http://maze.test/b.html", "<html>TARGET{dup} TARGET{new}</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/start.html",
            fetcher,
            matcher(),
            dfs_config(MatchMode::All, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        let texts: Vec<&str> = report.matches.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["TARGET{dup}", "TARGET{new}"]);
    }

    #[tokio::test]
    async fn test_dfs_skips_failed_fetches() {
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/start.html", r#"<html><a href="missing.html">m</a><a href="y.html">y</a></html>"#),
            ("http://maze.test/y.html", "<html>TARGET{ok}</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/start.html",
            fetcher,
            matcher(),
            dfs_config(MatchMode::All, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        // missing.html was attempted, skipped, and the hunt went on
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.matches.len(), 1);
    }

    #[tokio::test]
    async fn test_dfs_never_leaves_scope() {
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/start.html", r#"<html><a href="http://elsewhere.test/x.html">out</a><a href="in.html">in</a></html>"#),
            ("http://maze.test/in.html", "<html>leaf</html>"),
        ]);

        let t = Traversal::new(
            "http://maze.test/start.html",
            fetcher,
            matcher(),
            dfs_config(MatchMode::All, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        // Only the two in-scope pages were ever fetched
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.reason, StopReason::Exhausted);
    }

    #[tokio::test]
    async fn test_page_limit_is_a_hard_cap() {
        // Scenario: a chain longer than the limit allows
        let mut pages: Vec<(String, String)> = Vec::new();
        for i in 1..=10 {
            pages.push((
                format!("http://maze.test/pages/page-{}.html", i),
                link(&format!("page-{}.html", i + 1)),
            ));
        }
        let refs: Vec<(&str, &str)> = pages
            .iter()
            .map(|(u, b)| (u.as_str(), b.as_str()))
            .collect();
        let fetcher = FakeFetcher::new(&refs);

        let t = Traversal::new(
            "http://maze.test/pages/page-1.html",
            fetcher,
            matcher(),
            dfs_config(MatchMode::All, 5),
        )
        .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::LimitReached);
        assert_eq!(report.pages_fetched, 5);
        assert!(report.matches.is_empty());
    }

    #[tokio::test]
    async fn test_attempts_policy_counts_failures_too() {
        // Every link is dead; under the Attempts policy the limit still
        // trips even though nothing was successfully fetched past start
        let body = r#"<html>
            <a href="m1.html">1</a>
            <a href="m2.html">2</a>
            <a href="m3.html">3</a>
        </html>"#;
        let fetcher = FakeFetcher::new(&[("http://maze.test/start.html", body)]);

        let config = TraversalConfig {
            limit_policy: LimitPolicy::Attempts,
            ..dfs_config(MatchMode::All, 2)
        };
        let t = Traversal::new("http://maze.test/start.html", fetcher, matcher(), config)
            .unwrap();
        let report = t.run().await.unwrap();

        assert_eq!(report.reason, StopReason::LimitReached);
        assert_eq!(report.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_visited_grows_once_per_fetch_attempt() {
        let fetcher = FakeFetcher::new(&[
            ("http://maze.test/pages/page-1.html", &link("page-2.html")),
            ("http://maze.test/pages/page-2.html", &link("page-3.html")),
            ("http://maze.test/pages/page-3.html", "<html>end</html>"),
        ]);

        let mut t = Traversal::new(
            "http://maze.test/pages/page-1.html",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();

        let mut last = 0;
        loop {
            let done = t.step().await.unwrap().is_some();
            // Monotone, one new address per attempt, no refetches
            assert!(t.visited_count() >= last);
            assert_eq!(t.visited_count(), t.pages_fetched());
            last = t.visited_count();
            if done {
                break;
            }
        }
        assert_eq!(last, 3);
    }

    #[tokio::test]
    async fn test_start_fragment_is_stripped() {
        let fetcher = FakeFetcher::new(&[("http://maze.test/a.html", "<html>TARGET{x}</html>")]);

        let t = Traversal::new(
            "http://maze.test/a.html#frag",
            fetcher,
            matcher(),
            chain_config(MatchMode::First, 500),
        )
        .unwrap();
        let report = t.run().await.unwrap();
        assert_eq!(report.reason, StopReason::Found);
    }
}
