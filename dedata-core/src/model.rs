use dedata_scanner::CapturedSet;
use serde::{Deserialize, Serialize};

/// A dashboard configured for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSite {
    /// Navigation entry point.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TargetSite {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if set, otherwise the URL.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.url)
    }
}

/// Captured set of one site whose session succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSite {
    pub site: TargetSite,
    pub captured: CapturedSet,
}

/// Data URLs one site requested from a single host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainGroup {
    /// Host with any leading `www.` removed.
    pub domain: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReport {
    pub site: TargetSite,
    pub groups: Vec<DomainGroup>,
}

impl SiteReport {
    pub fn url_count(&self) -> usize {
        self.groups.iter().map(|g| g.urls.len()).sum()
    }
}

/// Grouped output of one aggregation run, in configured site order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub sites: Vec<SiteReport>,
}

impl RunResult {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site(&self, url: &str) -> Option<&SiteReport> {
        self.sites.iter().find(|s| s.site.url == url)
    }

    pub fn group_count(&self) -> usize {
        self.sites.iter().map(|s| s.groups.len()).sum()
    }

    pub fn url_count(&self) -> usize {
        self.sites.iter().map(SiteReport::url_count).sum()
    }
}
