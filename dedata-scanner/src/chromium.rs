//! Chromium implementation of the browser capability, via chromiumoxide.

use crate::browser::{BrowserInstance, BrowserLauncher, InterceptedRequest};
use crate::error::{Result, ScanError};
use crate::filter::{Decision, ResourceCategory};
use crate::idle::{IdleOptions, NetworkIdle};
use crate::session::RequestGate;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, ResourceType,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ChromiumOptions {
    /// Chromium binary; chromiumoxide's own detection is used when unset.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub no_sandbox: bool,
    /// Timeout for individual CDP commands, navigation included.
    pub request_timeout: Duration,
}

impl Default for ChromiumOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            no_sandbox: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Launches one fresh headless Chromium process per session.
pub struct ChromiumLauncher {
    options: ChromiumOptions,
}

impl ChromiumLauncher {
    pub fn new(options: ChromiumOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self, profile: &TempDir) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .enable_request_intercept()
            .request_timeout(self.options.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");

        if !self.options.headless {
            builder = builder.with_head();
        }
        if self.options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = self.options.executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| ScanError::LaunchError(format!("invalid browser config: {}", e)))
    }
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::new(ChromiumOptions::default())
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
        // Private profile: concurrent instances must not share a profile lock
        let profile = tempfile::Builder::new().prefix("dedata-profile-").tempdir()?;
        let config = self.browser_config(&profile)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Box::new(ChromiumInstance {
            browser,
            handler_task,
            profile,
        }))
    }
}

pub struct ChromiumInstance {
    browser: Browser,
    handler_task: JoinHandle<()>,
    profile: TempDir,
}

#[async_trait]
impl BrowserInstance for ChromiumInstance {
    async fn visit(&mut self, url: &str, gate: &mut RequestGate, idle: IdleOptions) -> Result<()> {
        let page = self.browser.new_page("about:blank").await?;

        let mut paused = page.event_listener::<EventRequestPaused>().await?;
        let mut sent = page.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = page.event_listener::<EventLoadingFailed>().await?;

        let mut network = NetworkIdle::new(idle, Instant::now());
        let mut loaded = false;
        let navigation = page.goto(url);
        tokio::pin!(navigation);

        loop {
            let deadline = network.visit_deadline(loaded);

            tokio::select! {
                Some(event) = paused.next() => {
                    apply_decision(&page, gate, &event).await;
                }
                Some(event) = sent.next() => {
                    network.request_started(event.request_id.inner().clone(), Instant::now());
                }
                Some(event) = finished.next() => {
                    network.request_settled(event.request_id.inner(), Instant::now());
                }
                Some(event) = failed.next() => {
                    network.request_settled(event.request_id.inner(), Instant::now());
                }
                result = &mut navigation, if !loaded => {
                    result?;
                    loaded = true;
                    debug!("Loaded {}, {} requests in flight", url, network.inflight());
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    debug!("Network idle for {}", url);
                    break;
                }
                else => {
                    return Err(ScanError::Other(format!(
                        "browser stopped reporting events for {}",
                        url
                    )));
                }
            }
        }

        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumInstance {
            mut browser,
            handler_task,
            profile,
        } = *self;

        if let Err(e) = browser.close().await {
            warn!("Graceful browser close failed, killing process: {}", e);
            if let Some(Err(e)) = browser.kill().await {
                warn!("Failed to kill browser process: {}", e);
            }
        }
        let waited = browser.wait().await;
        handler_task.abort();
        drop(profile);

        waited?;
        Ok(())
    }
}

async fn apply_decision(page: &Page, gate: &mut RequestGate, event: &EventRequestPaused) {
    let request = InterceptedRequest::new(
        event.request_id.inner().clone(),
        event.request.url.clone(),
        category_of(&event.resource_type),
    );

    let sent = match gate.resolve(&request) {
        None => return,
        Some(Decision::Abort) => page
            .execute(FailRequestParams::new(
                event.request_id.clone(),
                ErrorReason::BlockedByClient,
            ))
            .await
            .map(|_| ()),
        Some(Decision::CaptureAndForward | Decision::ForwardOnly) => page
            .execute(ContinueRequestParams::new(event.request_id.clone()))
            .await
            .map(|_| ()),
    };

    // The page may cancel a request between the pause and our answer
    if let Err(e) = sent {
        debug!("Could not resolve request {}: {}", request.url, e);
    }
}

pub fn category_of(resource_type: &ResourceType) -> ResourceCategory {
    match resource_type {
        ResourceType::Document => ResourceCategory::Document,
        ResourceType::Stylesheet => ResourceCategory::Stylesheet,
        ResourceType::Image => ResourceCategory::Image,
        ResourceType::Media => ResourceCategory::Media,
        ResourceType::Font => ResourceCategory::Font,
        ResourceType::Script => ResourceCategory::Script,
        ResourceType::Xhr => ResourceCategory::Xhr,
        ResourceType::Fetch => ResourceCategory::Fetch,
        ResourceType::EventSource => ResourceCategory::EventSource,
        ResourceType::WebSocket => ResourceCategory::WebSocket,
        _ => ResourceCategory::Other,
    }
}
