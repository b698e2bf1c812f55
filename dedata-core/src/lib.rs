pub mod aggregate;
pub mod config;
pub mod group;
pub mod model;
pub mod report;

pub use aggregate::{Aggregator, ScanEvent, ScanProgressCallback, execute_scan};
pub use config::{ConfigError, ScanConfig};
pub use group::{NoiseFilter, group_captures, group_site};
pub use model::{CapturedSite, DomainGroup, RunResult, SiteReport, TargetSite};
pub use report::ReportFormat;

pub fn print_banner() {
    println!(
        r#"
     _          _       _
  __| | ___  __| | __ _| |_ __ _
 / _` |/ _ \/ _` |/ _` | __/ _` |
| (_| |  __/ (_| | (_| | || (_| |
 \__,_|\___|\__,_|\__,_|\__\__,_|  v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
