// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    ScanOverrides, apply_overrides, load_config, load_urls_from_file, load_urls_from_source,
    parse_url_line, write_default_config,
};

// Re-export scan functionality from dedata-core
pub use dedata_core::group::extract_url_path;
pub use dedata_core::report::{ReportFormat, render};
