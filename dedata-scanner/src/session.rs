use crate::browser::{BrowserLauncher, InterceptedRequest};
use crate::error::{Result, ScanError};
use crate::filter::{Decision, ResourceFilter};
use crate::idle::IdleOptions;
use crate::result::{CapturedSet, SiteCapture};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Per-session interception state.
///
/// Owned by a single session; resolves each request at most once and
/// accumulates the URLs of forwarded data requests.
#[derive(Debug)]
pub struct RequestGate {
    filter: Arc<ResourceFilter>,
    resolved: HashSet<String>,
    captured: CapturedSet,
    aborted: usize,
}

impl RequestGate {
    pub fn new(filter: Arc<ResourceFilter>) -> Self {
        Self {
            filter,
            resolved: HashSet::new(),
            captured: CapturedSet::new(),
            aborted: 0,
        }
    }

    /// Decide what happens to `request`, or `None` if it was already resolved.
    pub fn resolve(&mut self, request: &InterceptedRequest) -> Option<Decision> {
        if !self.resolved.insert(request.id.clone()) {
            debug!("Request {} already resolved, skipping", request.id);
            return None;
        }

        let decision = self.filter.decide(&request.url, request.category);
        match decision {
            Decision::Abort => self.aborted += 1,
            Decision::CaptureAndForward => {
                if self.captured.insert(request.url.as_str()) {
                    debug!("Captured {:?} {}", request.category, request.url);
                }
            }
            Decision::ForwardOnly => {}
        }
        Some(decision)
    }

    pub fn captured(&self) -> &CapturedSet {
        &self.captured
    }

    pub fn aborted(&self) -> usize {
        self.aborted
    }

    pub fn into_captured(self) -> CapturedSet {
        self.captured
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Upper bound for navigation plus the network-idle wait.
    pub navigation_timeout: Duration,
    pub idle: IdleOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            idle: IdleOptions::default(),
        }
    }
}

/// Runs one end-to-end capture per call: launch, intercept, navigate, close.
pub struct SessionInterceptor {
    launcher: Arc<dyn BrowserLauncher>,
    filter: Arc<ResourceFilter>,
    options: SessionOptions,
}

impl SessionInterceptor {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, filter: ResourceFilter) -> Self {
        Self {
            launcher,
            filter: Arc::new(filter),
            options: SessionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub async fn capture(&self, url: &str) -> Result<SiteCapture> {
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        info!("Starting capture session for {}", url);
        let mut instance = self.launcher.launch().await?;
        let mut gate = RequestGate::new(self.filter.clone());

        let timeout = self.options.navigation_timeout;
        let visit = tokio::time::timeout(timeout, instance.visit(url, &mut gate, self.options.idle)).await;

        // The browser goes away on every path, before the outcome is reported
        if let Err(e) = instance.close().await {
            warn!("Failed to close browser for {}: {}", url, e);
        }

        match visit {
            Ok(Ok(())) => {
                info!(
                    "Capture complete for {}: {} data URLs, {} requests aborted",
                    url,
                    gate.captured().len(),
                    gate.aborted()
                );
                Ok(SiteCapture::new(url.to_string(), gate.into_captured()))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ScanError::NavigationTimeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }),
        }
    }
}
