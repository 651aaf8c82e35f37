// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_urls_from_file, load_urls_from_source, parse_url_line};

// Re-export audit functionality from linktrail-core
pub use linktrail_core::audit::{
    AuditOptions, AuditOutcome, AuditRequest, execute_audit, extract_url_path,
};
pub use linktrail_core::report::{ReportFormat, render};
