// Time-bounded cache for a locally discovered address.
//
// The clock and the discovery step are both supplied by the caller, which
// keeps the staleness rule testable without sleeping or touching sockets.

use std::time::{Duration, Instant};

use log::debug;

/// Default time-to-live for a cached address.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// True when nothing is cached or `now` is past `last_refresh + ttl`.
pub fn is_stale(now: Instant, last_refresh: Instant, ttl: Duration) -> bool {
    now.checked_duration_since(last_refresh)
        .is_some_and(|age| age > ttl)
}

/// A single cached address string with its refresh time.
#[derive(Debug, Clone)]
pub struct LocalAddrCache {
    cached: Option<String>,
    last_refresh: Instant,
    ttl: Duration,
}

impl LocalAddrCache {
    /// Empty cache. `now` seeds the refresh time.
    pub fn new(ttl: Duration, now: Instant) -> Self {
        Self {
            cached: None,
            last_refresh: now,
            ttl,
        }
    }

    pub fn cached(&self) -> Option<&str> {
        self.cached.as_deref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        self.cached.is_none() || is_stale(now, self.last_refresh, self.ttl)
    }

    /// Store `found` if it is `Some`. A failed discovery keeps the previous
    /// value and refresh time.
    pub fn refresh(&mut self, now: Instant, found: Option<String>) {
        if let Some(addr) = found {
            debug!("local address refreshed: {addr}");
            self.cached = Some(addr);
            self.last_refresh = now;
        }
    }

    /// The cached address, calling `discover` first when stale.
    pub fn get_or_refresh<F>(&mut self, now: Instant, discover: F) -> Option<&str>
    where
        F: FnOnce() -> Option<String>,
    {
        if self.is_stale(now) {
            self.refresh(now, discover());
        }
        self.cached()
    }
}

impl Default for LocalAddrCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, Instant::now())
    }
}
