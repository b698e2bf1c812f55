// Tests for output projections and report rendering

use dedata_core::model::{DomainGroup, RunResult, SiteReport, TargetSite};
use dedata_core::report::{
    ReportFormat, generate_text_report, grouped_view, intercepted_view, render,
};
use serde_json::{Value, json};

fn sample_run() -> RunResult {
    RunResult {
        sites: vec![
            SiteReport {
                site: TargetSite::new("https://info.uniswap.org/").with_label("Uniswap"),
                groups: vec![
                    DomainGroup {
                        domain: "api.thegraph.com".to_string(),
                        urls: vec![
                            "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3".to_string(),
                            "https://api.thegraph.com/index-node/graphql".to_string(),
                        ],
                    },
                    DomainGroup {
                        domain: "tokens.coingecko.com".to_string(),
                        urls: vec!["https://tokens.coingecko.com/uniswap/all.json".to_string()],
                    },
                ],
            },
            SiteReport {
                site: TargetSite::new("https://curve.fi/combinedstats"),
                groups: Vec::new(),
            },
        ],
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("api"), Some(ReportFormat::Api)));
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Api)));
    assert!(matches!(ReportFormat::from_str("page"), Some(ReportFormat::Page)));
    assert!(matches!(ReportFormat::from_str("grouped"), Some(ReportFormat::Page)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Page"), Some(ReportFormat::Page)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("xml").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Projection Tests
// ============================================================================

#[test]
fn test_intercepted_view_shape() {
    let value = serde_json::to_value(intercepted_view(&sample_run())).unwrap();

    assert_eq!(
        value,
        json!([
            {
                "siteUrl": "https://info.uniswap.org/",
                "interceptedUrls": [
                    {
                        "domain": "api.thegraph.com",
                        "url": "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3"
                    },
                    {
                        "domain": "api.thegraph.com",
                        "url": "https://api.thegraph.com/index-node/graphql"
                    },
                    {
                        "domain": "tokens.coingecko.com",
                        "url": "https://tokens.coingecko.com/uniswap/all.json"
                    }
                ]
            },
            {
                "siteUrl": "https://curve.fi/combinedstats",
                "interceptedUrls": []
            }
        ])
    );
}

#[test]
fn test_grouped_view_shape() {
    let value = serde_json::to_value(grouped_view(&sample_run())).unwrap();

    assert_eq!(value[0]["siteUrl"], "https://info.uniswap.org/");
    assert_eq!(value[0]["dataUrlGroups"][0]["domain"], "api.thegraph.com");
    assert_eq!(
        value[0]["dataUrlGroups"][0]["dataUrls"].as_array().unwrap().len(),
        2
    );
    assert_eq!(value[0]["dataUrlGroups"][1]["domain"], "tokens.coingecko.com");
    assert_eq!(value[1]["dataUrlGroups"], json!([]));
}

#[test]
fn test_views_agree_on_urls() {
    let run = sample_run();
    let flat: Vec<String> = intercepted_view(&run)[0]
        .intercepted_urls
        .iter()
        .map(|u| u.url.clone())
        .collect();
    let grouped: Vec<String> = grouped_view(&run)[0]
        .data_url_groups
        .iter()
        .flat_map(|g| g.data_urls.clone())
        .collect();

    assert_eq!(flat, grouped);
}

#[test]
fn test_empty_run_renders_empty_arrays() {
    let run = RunResult::default();
    assert_eq!(render(&run, ReportFormat::Api).unwrap(), "[]");
    assert_eq!(render(&run, ReportFormat::Page).unwrap(), "[]");
}

#[test]
fn test_render_api_is_valid_json() {
    let output = render(&sample_run(), ReportFormat::Api).unwrap();
    let parsed: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_lists_paths_per_domain() {
    let report = generate_text_report(&sample_run());

    assert!(report.contains("Uniswap"));
    assert!(report.contains("api.thegraph.com"));
    assert!(report.contains("/subgraphs/name/uniswap/uniswap-v3"));
    assert!(report.contains("/index-node/graphql"));
    assert!(report.contains("/uniswap/all.json"));
    assert!(report.contains("no external data APIs observed"));
}

#[test]
fn test_text_report_summary() {
    let report = generate_text_report(&sample_run());

    assert!(report.contains("Sites reported: 2"));
    assert!(report.contains("Data domains: 2"));
    assert!(report.contains("Data URLs: 3"));
}
