// Noise filtering and per-host grouping of captured URLs

use crate::model::{CapturedSite, DomainGroup, RunResult, SiteReport, TargetSite};
use dedata_scanner::CapturedSet;
use std::collections::HashSet;
use tracing::debug;
use url::{Host, Url};

/// Known third-party analytics / CDN domains, matched as hostname suffixes.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    ignored_suffixes: Vec<String>,
}

impl NoiseFilter {
    pub fn new<I, S>(ignored_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ignored_suffixes: ignored_suffixes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_ignored(&self, host: &str) -> bool {
        self.ignored_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()))
    }
}

/// Hostname of `url` with one leading `www.` removed.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    })
}

/// Last two dot-separated labels of a hostname.
pub fn second_level_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Second-level domain of a site URL, or `None` when its host is missing or
/// an IP literal.
pub fn site_second_level_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host()? {
        Host::Domain(_) => host_of(url).map(|host| second_level_domain(&host)),
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Group one site's captured URLs into external data dependencies.
///
/// Drops ignored domains, buckets the rest by host in first-seen order,
/// removes hosts sharing the site's second-level domain, then keeps only the
/// first URL for each distinct path within a host.
pub fn group_site(site: &TargetSite, captured: &CapturedSet, noise: &NoiseFilter) -> SiteReport {
    let mut groups: Vec<DomainGroup> = Vec::new();

    for url in captured.iter() {
        let Some(host) = host_of(url) else {
            debug!("Skipping captured URL without a host: {}", url);
            continue;
        };
        if noise.is_ignored(&host) {
            continue;
        }

        match groups.iter_mut().find(|g| g.domain == host) {
            Some(group) => group.urls.push(url.to_string()),
            None => groups.push(DomainGroup {
                domain: host,
                urls: vec![url.to_string()],
            }),
        }
    }

    // Sites without a domain name keep all of their groups
    if let Some(site_sld) = site_second_level_domain(&site.url) {
        groups.retain(|g| second_level_domain(&g.domain) != site_sld);
    }

    for group in &mut groups {
        let mut seen_paths = HashSet::new();
        group
            .urls
            .retain(|url| seen_paths.insert(extract_url_path(url)));
    }

    SiteReport {
        site: site.clone(),
        groups,
    }
}

pub fn group_captures(captures: &[CapturedSite], noise: &NoiseFilter) -> RunResult {
    RunResult {
        sites: captures
            .iter()
            .map(|c| group_site(&c.site, &c.captured, noise))
            .collect(),
    }
}
