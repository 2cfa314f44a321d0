//! Politeness controller for the crawl loop
//!
//! Enforces a minimum delay between two requests to the same host. robots.txt
//! and backoff are the fetch layer's concern and are not handled here.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Decision about whether a host may be fetched now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// Fetch is allowed
    Allowed,
    /// Must wait for the specified duration
    WaitFor(Duration),
}

/// Per-host request spacing
#[derive(Debug)]
pub struct PolitenessController {
    delay: Duration,
    /// When each host was last handed out for fetching
    last_fetch: HashMap<String, Instant>,
}

impl PolitenessController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_fetch: HashMap::new(),
        }
    }

    /// Check whether `host` may be fetched at `now`
    pub fn check(&self, host: &str, now: Instant) -> FetchDecision {
        match self.last_fetch.get(host) {
            Some(last) => {
                let ready_at = *last + self.delay;
                if ready_at > now {
                    FetchDecision::WaitFor(ready_at - now)
                } else {
                    FetchDecision::Allowed
                }
            }
            None => FetchDecision::Allowed,
        }
    }

    /// Whether `host` may be fetched right now
    pub fn is_ready(&self, host: &str) -> bool {
        self.check(host, Instant::now()) == FetchDecision::Allowed
    }

    /// Mark `host` as fetched now
    pub fn record_fetch(&mut self, host: &str) {
        self.last_fetch.insert(host.to_string(), Instant::now());
    }

    /// Shortest remaining wait among hosts still inside their delay.
    /// `None` when no tracked host is waiting.
    pub fn next_ready_in(&self) -> Option<Duration> {
        let now = Instant::now();
        self.last_fetch
            .values()
            .map(|last| (*last + self.delay).saturating_duration_since(now))
            .filter(|wait| !wait.is_zero())
            .min()
    }

    pub fn tracked_hosts(&self) -> usize {
        self.last_fetch.len()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_host_allowed() {
        let politeness = PolitenessController::new(Duration::from_secs(1));
        assert!(politeness.is_ready("www.ics.uci.edu"));
        assert_eq!(politeness.tracked_hosts(), 0);
    }

    #[test]
    fn test_recent_fetch_must_wait() {
        let mut politeness = PolitenessController::new(Duration::from_secs(60));
        politeness.record_fetch("www.ics.uci.edu");

        assert!(!politeness.is_ready("www.ics.uci.edu"));
        assert!(politeness.is_ready("www.stat.uci.edu"));
        match politeness.check("www.ics.uci.edu", Instant::now()) {
            FetchDecision::WaitFor(wait) => assert!(wait <= Duration::from_secs(60)),
            FetchDecision::Allowed => panic!("host should be waiting"),
        }
    }

    #[test]
    fn test_zero_delay_never_waits() {
        let mut politeness = PolitenessController::new(Duration::ZERO);
        politeness.record_fetch("www.ics.uci.edu");
        assert!(politeness.is_ready("www.ics.uci.edu"));
        assert_eq!(politeness.next_ready_in(), None);
    }

    #[test]
    fn test_next_ready_in_ignores_ready_hosts() {
        let delay = Duration::from_millis(200);
        let mut politeness = PolitenessController::new(delay);
        politeness.record_fetch("www.ics.uci.edu");
        std::thread::sleep(Duration::from_millis(250));
        politeness.record_fetch("www.stat.uci.edu");

        assert!(politeness.is_ready("www.ics.uci.edu"));
        let wait = politeness
            .next_ready_in()
            .expect("www.stat.uci.edu is still waiting");
        assert!(wait > Duration::ZERO);
        assert!(wait <= delay);
    }

    #[test]
    fn test_delay_elapses() {
        let mut politeness = PolitenessController::new(Duration::from_millis(10));
        politeness.record_fetch("www.ics.uci.edu");
        std::thread::sleep(Duration::from_millis(20));
        assert!(politeness.is_ready("www.ics.uci.edu"));
    }
}
