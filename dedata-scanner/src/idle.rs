use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// When a page counts as having stopped issuing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleOptions {
    /// In-flight requests still tolerated while idle.
    pub max_inflight: usize,
    /// How long the page must stay at or under `max_inflight`.
    pub window: Duration,
}

impl Default for IdleOptions {
    fn default() -> Self {
        Self {
            max_inflight: 0,
            window: Duration::from_millis(500),
        }
    }
}

/// Tracks outstanding network requests for one page.
///
/// The page is quiesced once it has held at most `max_inflight`
/// outstanding requests for a full `window`.
#[derive(Debug)]
pub struct NetworkIdle {
    options: IdleOptions,
    inflight: HashSet<String>,
    quiet_since: Option<Instant>,
}

impl NetworkIdle {
    pub fn new(options: IdleOptions, now: Instant) -> Self {
        Self {
            options,
            inflight: HashSet::new(),
            quiet_since: Some(now),
        }
    }

    pub fn request_started(&mut self, request_id: impl Into<String>, now: Instant) {
        self.inflight.insert(request_id.into());
        self.refresh(now);
    }

    pub fn request_settled(&mut self, request_id: &str, now: Instant) {
        self.inflight.remove(request_id);
        self.refresh(now);
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    /// Instant at which the page becomes idle if nothing else starts.
    pub fn deadline(&self) -> Option<Instant> {
        self.quiet_since.map(|since| since + self.options.window)
    }

    /// Deadline that may end a visit. Nothing ends it before the document
    /// itself has loaded, however long the network has been quiet.
    pub fn visit_deadline(&self, loaded: bool) -> Option<Instant> {
        self.deadline().filter(|_| loaded)
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    fn refresh(&mut self, now: Instant) {
        let quiet = self.inflight.len() <= self.options.max_inflight;
        match (quiet, self.quiet_since) {
            (true, None) => self.quiet_since = Some(now),
            (false, Some(_)) => self.quiet_since = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_idle_after_window_with_no_requests() {
        let start = Instant::now();
        let idle = NetworkIdle::new(IdleOptions::default(), start);
        assert!(!idle.is_idle(start + ms(499)));
        assert!(idle.is_idle(start + ms(500)));
    }

    #[test]
    fn test_inflight_request_blocks_idle() {
        let start = Instant::now();
        let mut idle = NetworkIdle::new(IdleOptions::default(), start);
        idle.request_started("1", start + ms(100));
        assert_eq!(idle.deadline(), None);
        assert!(!idle.is_idle(start + ms(5_000)));

        idle.request_settled("1", start + ms(1_000));
        assert_eq!(idle.deadline(), Some(start + ms(1_500)));
        assert!(idle.is_idle(start + ms(1_500)));
    }

    #[test]
    fn test_tolerates_configured_inflight() {
        let start = Instant::now();
        let options = IdleOptions {
            max_inflight: 2,
            window: ms(500),
        };
        let mut idle = NetworkIdle::new(options, start);
        idle.request_started("a", start);
        idle.request_started("b", start);
        assert!(idle.is_idle(start + ms(500)));

        idle.request_started("c", start + ms(600));
        assert!(!idle.is_idle(start + ms(700)));

        idle.request_settled("a", start + ms(800));
        assert_eq!(idle.deadline(), Some(start + ms(1_300)));
    }

    #[test]
    fn test_quiet_period_restarts_after_burst() {
        let start = Instant::now();
        let mut idle = NetworkIdle::new(IdleOptions::default(), start);
        idle.request_started("1", start + ms(400));
        idle.request_settled("1", start + ms(450));
        assert!(!idle.is_idle(start + ms(600)));
        assert!(idle.is_idle(start + ms(950)));
    }

    #[test]
    fn test_no_visit_deadline_before_load() {
        let start = Instant::now();
        let idle = NetworkIdle::new(IdleOptions::default(), start);
        assert!(idle.is_idle(start + ms(10_000)));
        assert_eq!(idle.visit_deadline(false), None);
        assert_eq!(idle.visit_deadline(true), Some(start + ms(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_navigation_is_not_cut_short_by_quiet_network() {
        let start = Instant::now();
        let network = NetworkIdle::new(IdleOptions::default(), start);
        let navigation = tokio::time::sleep(ms(3_000));
        tokio::pin!(navigation);
        let mut loaded = false;

        let ended_at = loop {
            let deadline = network.visit_deadline(loaded);
            tokio::select! {
                _ = &mut navigation, if !loaded => {
                    loaded = true;
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    break Instant::now();
                }
            }
        };

        // Quiet since the start, so the visit ends as soon as the page loads
        assert!(loaded);
        assert_eq!(ended_at - start, ms(3_000));
    }

    #[test]
    fn test_unknown_settle_is_harmless() {
        let start = Instant::now();
        let mut idle = NetworkIdle::new(IdleOptions::default(), start);
        idle.request_settled("never-started", start + ms(100));
        assert_eq!(idle.inflight(), 0);
        assert_eq!(idle.deadline(), Some(start + ms(500)));
    }
}
