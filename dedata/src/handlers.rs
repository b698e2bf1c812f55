use clap::ArgMatches;
use colored::Colorize;
use dedata_core::aggregate::{ScanEvent, ScanProgressCallback, execute_scan};
use dedata_core::config::{DEFAULT_CONFIG_PATH, ScanConfig, config_exists, expand_path};
use dedata_core::model::TargetSite;
use dedata_core::report::{ReportFormat, render};
use dedata_scanner::ChromiumLauncher;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;
use url::Url;

// Helper functions for scan handler

/// Load site URLs from either a file or the `--url` arguments.
/// Returns `Ok(None)` when neither was given.
pub fn load_urls_from_source(
    urls: &[Url],
    sites_file: Option<&PathBuf>,
) -> Result<Option<Vec<String>>, String> {
    if let Some(sites_file_path) = sites_file {
        load_urls_from_file(sites_file_path).map(Some)
    } else if !urls.is_empty() {
        Ok(Some(urls.iter().map(|u| u.as_str().to_string()).collect()))
    } else {
        Ok(None)
    }
}

/// Load and parse site URLs from a file, skipping blank lines and `#` comments
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sites file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a site URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.host_str().is_some()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.host_str().is_some_and(|h| !h.contains(' '))
    {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Load the config named by `--config`, or the default file if present,
/// or the built-in defaults.
pub fn load_config(path: Option<&String>) -> Result<ScanConfig, String> {
    match path {
        Some(path) => ScanConfig::load(path).map_err(|e| e.to_string()),
        None if config_exists(DEFAULT_CONFIG_PATH) => {
            ScanConfig::load(DEFAULT_CONFIG_PATH).map_err(|e| e.to_string())
        }
        None => Ok(ScanConfig::default()),
    }
}

/// Command-line overrides applied on top of a loaded config.
#[derive(Debug, Default)]
pub struct ScanOverrides {
    pub sites: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub chrome: Option<PathBuf>,
    pub headful: bool,
    pub no_sandbox: bool,
}

pub fn apply_overrides(mut config: ScanConfig, overrides: ScanOverrides) -> Result<ScanConfig, String> {
    if let Some(sites) = overrides.sites {
        config.sites = sites.into_iter().map(TargetSite::new).collect();
    }
    if let Some(secs) = overrides.timeout_secs {
        config.session.timeout_secs = secs;
    }
    if let Some(chrome) = overrides.chrome {
        config.browser.executable = Some(chrome);
    }
    if overrides.headful {
        config.browser.headless = false;
    }
    if overrides.no_sandbox {
        config.browser.no_sandbox = true;
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Write the default configuration; refuses to replace a file unless `force`.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }

    let json = ScanConfig::default()
        .to_json()
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    let _ = io::stdout().flush();
    let mut response = String::new();
    let _ = io::stdin().read_line(&mut response);
    response.trim().to_lowercase()
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // Logs go to stderr so JSON output on stdout stays clean
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

pub fn handle_init(args: &ArgMatches) {
    let raw_path = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);
    let mut force = args.get_flag("force");
    let path = expand_path(raw_path);

    if path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!(
            "Configuration already exists: {}",
            path.display().to_string().bright_white()
        );
        let response = print_prompt("Overwrite it with the defaults? [y/N]:");
        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return;
        }
        force = true;
    }

    match write_default_config(&path, force) {
        Ok(()) => println!(
            "{} Default configuration written to {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        ),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub fn handle_sites(args: &ArgMatches) {
    let config = match load_config(args.get_one::<String>("config")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    for site in &config.sites {
        match site.label {
            Some(ref label) => println!("{:<14} {}", label.bright_white().bold(), site.url),
            None => println!("{:<14} {}", "-", site.url),
        }
    }
}

pub async fn handle_scan(sub_matches: &ArgMatches, quiet: bool) {
    init_tracing(sub_matches.get_flag("verbose"));

    let urls: Vec<Url> = sub_matches
        .get_many::<Url>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let sites_file = sub_matches.get_one::<PathBuf>("sites-file");
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<PathBuf>("output");

    let config = load_config(sub_matches.get_one::<String>("config")).and_then(|config| {
        let overrides = ScanOverrides {
            sites: load_urls_from_source(&urls, sites_file)?,
            timeout_secs: sub_matches.get_one::<u64>("timeout").copied(),
            chrome: sub_matches.get_one::<PathBuf>("chrome").cloned(),
            headful: sub_matches.get_flag("headful"),
            no_sandbox: sub_matches.get_flag("no-sandbox"),
        };
        apply_overrides(config, overrides)
    });
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if !quiet {
        eprintln!("\n🔎 Scanning {} site(s)", config.sites.len());
        eprintln!("Timeout: {}s per site\n", config.session.timeout_secs);
    }

    let failures: Arc<Mutex<Vec<(TargetSite, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let multi = Arc::new(MultiProgress::new());
    let progress_callback = scan_progress_callback(multi.clone(), failures.clone(), quiet);

    let launcher = Arc::new(ChromiumLauncher::new(config.chromium_options()));
    let run = execute_scan(&config, launcher, Some(progress_callback)).await;
    let _ = multi.clear();

    if let Ok(failures) = failures.lock()
        && !failures.is_empty()
    {
        eprintln!("{} {} site(s) failed:", "✗".red().bold(), failures.len());
        for (site, reason) in failures.iter() {
            eprintln!("  {} {}: {}", "•".red(), site.url, reason);
        }
        eprintln!();
    }

    let rendered = match render(&run, format) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("{} Failed to render report: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => match fs::write(path, &rendered) {
            Ok(()) => eprintln!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(e) => {
                eprintln!("{} Failed to write {}: {}", "✗".red().bold(), path.display(), e);
                std::process::exit(1);
            }
        },
        None => println!("{}", rendered),
    }
}

/// One spinner per site; failures are also collected for the final summary.
fn scan_progress_callback(
    multi: Arc<MultiProgress>,
    failures: Arc<Mutex<Vec<(TargetSite, String)>>>,
    quiet: bool,
) -> ScanProgressCallback {
    let bars: Arc<Mutex<HashMap<String, ProgressBar>>> = Arc::new(Mutex::new(HashMap::new()));

    Arc::new(move |event: ScanEvent| {
        let Ok(mut bars) = bars.lock() else {
            return;
        };
        match event {
            ScanEvent::Started { site } => {
                if quiet {
                    return;
                }
                let pb = multi.add(ProgressBar::new_spinner());
                if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                    pb.set_style(style);
                }
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_message(format!("{}: loading", site.display_name()));
                bars.insert(site.url, pb);
            }
            ScanEvent::Captured { site, urls } => {
                if let Some(pb) = bars.remove(&site.url) {
                    pb.finish_with_message(format!(
                        "{} {}: {} data URLs",
                        "✓".green(),
                        site.display_name(),
                        urls
                    ));
                }
            }
            ScanEvent::Failed { site, reason } => {
                if let Some(pb) = bars.remove(&site.url) {
                    pb.finish_with_message(format!("{} {}: failed", "✗".red(), site.display_name()));
                }
                if let Ok(mut failures) = failures.lock() {
                    failures.push((site, reason));
                }
            }
        }
    })
}
