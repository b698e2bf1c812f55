use crate::config::ScanConfig;
use crate::group::group_captures;
use crate::model::{CapturedSite, RunResult, TargetSite};
use dedata_scanner::{BrowserLauncher, ScanError, SessionInterceptor};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Lifecycle of one site session, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Started { site: TargetSite },
    Captured { site: TargetSite, urls: usize },
    Failed { site: TargetSite, reason: String },
}

/// Callback for reporting session progress and failures as they happen
pub type ScanProgressCallback = Arc<dyn Fn(ScanEvent) + Send + Sync>;

/// Runs one session per site concurrently and keeps the ones that succeed.
pub struct Aggregator {
    interceptor: Arc<SessionInterceptor>,
    progress_callback: Option<ScanProgressCallback>,
}

impl Aggregator {
    pub fn new(interceptor: SessionInterceptor) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ScanProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn report(&self, event: ScanEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }

    /// Capture every site; failed sites are reported and left out.
    ///
    /// Progress events are reported as each session settles, but the
    /// returned captures follow the order of `sites`. A repeated site URL is
    /// only scanned once.
    pub async fn capture_all(&self, sites: &[TargetSite]) -> Vec<CapturedSite> {
        let mut seen = HashSet::new();
        let unique: Vec<&TargetSite> = sites
            .iter()
            .filter(|site| seen.insert(site.url.as_str()))
            .collect();

        info!("Starting capture of {} sites", unique.len());

        let mut pending = FuturesUnordered::new();
        for (index, site) in unique.into_iter().enumerate() {
            self.report(ScanEvent::Started { site: site.clone() });

            let interceptor = self.interceptor.clone();
            let url = site.url.clone();
            let handle = tokio::spawn(async move { interceptor.capture(&url).await });
            let site = site.clone();
            pending.push(async move { (index, site, handle.await) });
        }

        // Events go out as sessions settle; results are put back in site order afterwards
        let mut captures = Vec::new();
        while let Some((index, site, joined)) = pending.next().await {
            // A panicking session shows up as a join error, isolated like any other failure
            let outcome = joined.map_err(ScanError::from).and_then(|r| r);
            match outcome {
                Ok(capture) => {
                    self.report(ScanEvent::Captured {
                        site: site.clone(),
                        urls: capture.captured.len(),
                    });
                    captures.push((
                        index,
                        CapturedSite {
                            site,
                            captured: capture.captured,
                        },
                    ));
                }
                Err(e) => {
                    error!("Failed to capture {}: {}", site.url, e);
                    self.report(ScanEvent::Failed {
                        site,
                        reason: e.to_string(),
                    });
                }
            }
        }
        captures.sort_by_key(|(index, _)| *index);
        let captures: Vec<CapturedSite> = captures.into_iter().map(|(_, c)| c).collect();

        if captures.is_empty() && !sites.is_empty() {
            warn!("No site session succeeded");
        }
        info!("Capture complete. {} of {} sites succeeded", captures.len(), seen.len());
        captures
    }
}

/// Execute a full run: fan out over the configured sites, then group and filter.
pub async fn execute_scan(
    config: &ScanConfig,
    launcher: Arc<dyn BrowserLauncher>,
    progress_callback: Option<ScanProgressCallback>,
) -> RunResult {
    let interceptor = SessionInterceptor::new(launcher, config.resource_filter())
        .with_options(config.session_options());

    let mut aggregator = Aggregator::new(interceptor);
    if let Some(callback) = progress_callback {
        aggregator = aggregator.with_progress_callback(callback);
    }

    let captures = aggregator.capture_all(&config.sites).await;
    group_captures(&captures, &config.noise_filter())
}
