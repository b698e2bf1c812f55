//! Browser automation capability consumed by the session interceptor.
//!
//! The interceptor only needs to launch an isolated browser, visit one URL
//! with interception enabled, and close the browser again. Chromium is the
//! production implementation; tests plug in scripted fakes.

use crate::error::Result;
use crate::filter::ResourceCategory;
use crate::idle::IdleOptions;
use crate::session::RequestGate;
use async_trait::async_trait;

/// A request paused by the browser, waiting for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    /// Interception id; unique per pending request within a page.
    pub id: String,
    pub url: String,
    pub category: ResourceCategory,
}

impl InterceptedRequest {
    pub fn new(id: impl Into<String>, url: impl Into<String>, category: ResourceCategory) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            category,
        }
    }
}

/// Starts isolated browser instances. One instance per session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>>;
}

/// A running browser owned by exactly one session.
#[async_trait]
pub trait BrowserInstance: Send {
    /// Open a page with request interception enabled, navigate to `url` and
    /// return once the network has quiesced according to `idle`.
    ///
    /// Every paused request must be passed to `gate`. The returned decision
    /// has to be applied to the request; a `None` means the request was
    /// already resolved and must be left alone.
    async fn visit(&mut self, url: &str, gate: &mut RequestGate, idle: IdleOptions) -> Result<()>;

    /// Tear the browser down. Called on every exit path of a session.
    async fn close(self: Box<Self>) -> Result<()>;
}
