// src/traverse/scope.rs
// =============================================================================
// This module decides whether an address is inside the crawl boundary.
//
// Scope = same authority (host + effective port) as the start address,
// and an HTTP-family scheme. Nothing fancier: no subdomain matching, no
// wildcards. If you started on maze.test:8031, you stay on maze.test:8031.
//
// Rust concepts:
// - url::Url gives us host_str() and port_or_known_default(), so
//   http://host/ and http://host:80/ compare equal like they should
// =============================================================================

use anyhow::{anyhow, Result};
use url::Url;

// The authority the whole run is fenced into, fixed at start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    host: String,
    port: Option<u16>,
}

impl Origin {
    // Derives the origin from the start address
    pub fn from_url(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("Start URL has no host: {}", url))?
            .to_string();
        Ok(Self {
            host,
            port: url.port_or_known_default(),
        })
    }

    // True iff addr is http/https on exactly this authority
    pub fn in_scope(&self, addr: &str) -> bool {
        let parsed = match Url::parse(addr) {
            Ok(url) => url,
            Err(_) => return false,
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        parsed.host_str() == Some(self.host.as_str())
            && parsed.port_or_known_default() == self.port
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}
