pub mod audit;
pub mod report;

pub use audit::{
    AuditError, AuditOptions, AuditOutcome, AuditRequest, AuditResponse, RequestError,
    execute_audit, extract_url_path, handle_request,
};
pub use report::{AuditSummary, ReportError, ReportFormat, render, summarize};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
   _ _      _    _             _ _
  | (_)_ _ | |__| |_ _ _ __ _ (_) |
  | | | ' \| / /|  _| '_/ _` || | |
  |_|_|_||_|_\_\ \__|_| \__,_||_|_|
"#;
    eprintln!("{}", banner.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "every link, every hop".dimmed(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
