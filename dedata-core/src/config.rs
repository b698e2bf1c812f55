use crate::group::NoiseFilter;
use crate::model::TargetSite;
use dedata_scanner::{ChromiumOptions, IdleOptions, ResourceFilter, SessionOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/dedata/config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No target sites configured")]
    NoSites,

    #[error("Invalid site URL '{url}': {reason}")]
    InvalidSite { url: String, reason: String },
}

/// Everything one aggregation run needs, fixed at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub sites: Vec<TargetSite>,
    /// Hostname suffixes of analytics / CDN traffic to drop.
    pub ignored_domains: Vec<String>,
    /// URL path suffixes aborted before they leave the browser. Never add
    /// `.js` here: scripts fire the data requests.
    pub abort_suffixes: Vec<String>,
    pub session: SessionSettings,
    pub browser: BrowserSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub timeout_secs: u64,
    pub idle_window_ms: u64,
    pub max_inflight: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub no_sandbox: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            ignored_domains: to_strings(&[
                "google-analytics.com",
                "doubleclick.net",
                "sentry.io",
                "unpkg.com",
            ]),
            abort_suffixes: to_strings(&[".png", ".jpg", ".css", ".svg", ".ico"]),
            session: SessionSettings::default(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            idle_window_ms: 500,
            max_inflight: 0,
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            no_sandbox: false,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_sites() -> Vec<TargetSite> {
    [
        ("https://info.uniswap.org/", "Uniswap"),
        ("https://pancakeswap.finance/info", "PancakeSwap"),
        ("https://curve.fi/combinedstats", "Curve"),
        ("https://app.anchorprotocol.com/", "Anchor"),
        ("https://www.convexfinance.com/stake", "Convex"),
        ("https://app.aave.com/markets/", "Aave"),
        ("https://compound.finance/markets", "Compound"),
    ]
    .into_iter()
    .map(|(url, label)| TargetSite::new(url).with_label(label))
    .collect()
}

impl ScanConfig {
    /// Load a JSON config; `~` is expanded and missing fields take defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let path = expand_path(path);
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Reject what the core treats as a precondition: no sites, or site URLs
    /// that are not absolute http(s) URLs with a host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sites.is_empty() {
            return Err(ConfigError::NoSites);
        }
        for site in &self.sites {
            validate_site_url(&site.url)?;
        }
        Ok(())
    }

    pub fn resource_filter(&self) -> ResourceFilter {
        ResourceFilter::new(&self.abort_suffixes)
    }

    pub fn noise_filter(&self) -> NoiseFilter {
        NoiseFilter::new(&self.ignored_domains)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            navigation_timeout: Duration::from_secs(self.session.timeout_secs),
            idle: IdleOptions {
                max_inflight: self.session.max_inflight,
                window: Duration::from_millis(self.session.idle_window_ms),
            },
        }
    }

    pub fn chromium_options(&self) -> ChromiumOptions {
        ChromiumOptions {
            executable: self.browser.executable.clone(),
            headless: self.browser.headless,
            no_sandbox: self.browser.no_sandbox,
            request_timeout: Duration::from_secs(self.session.timeout_secs),
        }
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

pub fn validate_site_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSite {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}

/// Whether a config file already exists at `path` (after `~` expansion).
pub fn config_exists(path: &str) -> bool {
    Path::new(&expand_path(path)).exists()
}
