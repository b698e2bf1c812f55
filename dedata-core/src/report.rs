// Output projections of a run result

use crate::group::extract_url_path;
use crate::model::RunResult;
use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable listing of paths per domain.
    Text,
    /// Flat `{siteUrl, interceptedUrls: [{domain, url}]}` array.
    Api,
    /// Grouped `{siteUrl, dataUrlGroups: [{domain, dataUrls}]}` array.
    Page,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "api" | "json" => Some(ReportFormat::Api),
            "page" | "grouped" => Some(ReportFormat::Page),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptedSite {
    pub site_url: String,
    pub intercepted_urls: Vec<InterceptedUrl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptedUrl {
    pub domain: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDataUrls {
    pub site_url: String,
    pub data_url_groups: Vec<DataUrlGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUrlGroup {
    pub domain: String,
    pub data_urls: Vec<String>,
}

/// Flat view: every data URL tagged with its domain.
pub fn intercepted_view(run: &RunResult) -> Vec<InterceptedSite> {
    run.sites
        .iter()
        .map(|report| InterceptedSite {
            site_url: report.site.url.clone(),
            intercepted_urls: report
                .groups
                .iter()
                .flat_map(|g| {
                    g.urls.iter().map(|url| InterceptedUrl {
                        domain: g.domain.clone(),
                        url: url.clone(),
                    })
                })
                .collect(),
        })
        .collect()
}

/// Grouped view: data URLs bucketed by domain.
pub fn grouped_view(run: &RunResult) -> Vec<SiteDataUrls> {
    run.sites
        .iter()
        .map(|report| SiteDataUrls {
            site_url: report.site.url.clone(),
            data_url_groups: report
                .groups
                .iter()
                .map(|g| DataUrlGroup {
                    domain: g.domain.clone(),
                    data_urls: g.urls.clone(),
                })
                .collect(),
        })
        .collect()
}

pub fn render(run: &RunResult, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(run)),
        ReportFormat::Api => serde_json::to_string_pretty(&intercepted_view(run)),
        ReportFormat::Page => serde_json::to_string_pretty(&grouped_view(run)),
    }
}

/// Generate a text report from a run result
pub fn generate_text_report(run: &RunResult) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!(
        "  dedata report - {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for site in &run.sites {
        match site.site.label {
            Some(ref label) => report.push_str(&format!(
                "## {} {}\n",
                label.bright_white().bold(),
                site.site.url.red()
            )),
            None => report.push_str(&format!("## {}\n", site.site.url.red())),
        }

        if site.groups.is_empty() {
            report.push_str(&format!("  {}\n\n", "no external data APIs observed".dimmed()));
            continue;
        }

        for group in &site.groups {
            report.push_str(&format!("  - {}\n", group.domain.bright_cyan()));
            for url in &group.urls {
                report.push_str(&format!("      - {}\n", extract_url_path(url)));
            }
        }
        report.push('\n');
    }

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Sites reported: {}\n", run.len()));
    report.push_str(&format!("  Data domains: {}\n", run.group_count()));
    report.push_str(&format!("  Data URLs: {}\n", run.url_count()));

    report
}
