use serde::{Deserialize, Serialize};
use url::Url;

/// Resource category a browser reports for an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Other,
}

impl ResourceCategory {
    /// Categories browsers use for programmatic data requests.
    pub fn is_data_fetch(self) -> bool {
        matches!(self, ResourceCategory::Fetch | ResourceCategory::Xhr)
    }
}

/// What to do with one intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fail the request before it leaves the browser.
    Abort,
    /// Record the URL, then let the request through.
    CaptureAndForward,
    /// Let the request through without recording it.
    ForwardOnly,
}

impl Decision {
    pub fn is_abort(self) -> bool {
        self == Decision::Abort
    }
}

/// Static request policy applied to every request a page issues.
///
/// Scripts are never aborted: they are what fire the data requests we are
/// looking for.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    abort_suffixes: Vec<String>,
}

impl ResourceFilter {
    pub fn new<I, S>(abort_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            abort_suffixes: abort_suffixes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn abort_suffixes(&self) -> &[String] {
        &self.abort_suffixes
    }

    pub fn decide(&self, url: &str, category: ResourceCategory) -> Decision {
        if self.is_static_asset(url) {
            Decision::Abort
        } else if category.is_data_fetch() {
            Decision::CaptureAndForward
        } else {
            Decision::ForwardOnly
        }
    }

    fn is_static_asset(&self, url: &str) -> bool {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_ascii_lowercase(),
            Err(_) => url.to_ascii_lowercase(),
        };
        self.abort_suffixes
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }
}
