// Report rendering for audit responses

use crate::audit::{AuditResponse, extract_url_path};
use colored::Colorize;
use linktrail_scanner::{LinkResult, LinkType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_links: usize,
    pub internal: usize,
    pub external: usize,
    pub broken: usize,
    pub redirected: usize,
    pub pages_visited: usize,
    pub remaining: usize,
}

pub fn summarize(response: &AuditResponse) -> AuditSummary {
    let mut summary = AuditSummary {
        total_links: response.results.len(),
        pages_visited: response.stats.visited,
        remaining: response.stats.remaining,
        ..Default::default()
    };

    for result in &response.results {
        match result.link_type {
            LinkType::Internal => summary.internal += 1,
            LinkType::External => summary.external += 1,
        }
        if result.is_broken() {
            summary.broken += 1;
        }
        if result.is_redirected() {
            summary.redirected += 1;
        }
    }

    summary
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode CSV report: {0}")]
    Csv(#[from] csv::Error),
}

pub fn render(response: &AuditResponse, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(response)),
        ReportFormat::Json => Ok(generate_json_report(response)?),
        ReportFormat::Csv => Ok(generate_csv_report(response)?),
        ReportFormat::Markdown => Ok(generate_markdown_report(response)),
    }
}

fn colorize_status(status: u16) -> String {
    let text = if status == 0 {
        "ERR".to_string()
    } else {
        status.to_string()
    };
    match status {
        200..=299 => text.green().to_string(),
        300..=399 => text.cyan().to_string(),
        400..=499 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// Group results by the page they were found on, keeping crawl order.
fn group_by_source(results: &[LinkResult]) -> Vec<(&str, Vec<&LinkResult>)> {
    let mut groups: Vec<(&str, Vec<&LinkResult>)> = Vec::new();
    for result in results {
        match groups
            .iter_mut()
            .find(|(source, _)| *source == result.source_url)
        {
            Some((_, members)) => members.push(result),
            None => groups.push((result.source_url.as_str(), vec![result])),
        }
    }
    groups
}

pub fn generate_text_report(response: &AuditResponse) -> String {
    let summary = summarize(response);
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Links checked:  {}\n", summary.total_links));
    report.push_str(&format!("  Internal:       {}\n", summary.internal));
    report.push_str(&format!("  External:       {}\n", summary.external));
    report.push_str(&format!("  Broken:         {}\n", summary.broken));
    report.push_str(&format!("  Redirected:     {}\n", summary.redirected));
    report.push_str(&format!("  Pages visited:  {}\n", summary.pages_visited));
    if summary.remaining > 0 {
        report.push_str(&format!("  Not crawled:    {}\n", summary.remaining));
    }
    if response.stats.unchecked > 0 {
        report.push_str(&format!("  Unchecked:      {}\n", response.stats.unchecked));
    }
    if response.stats.cancelled {
        report.push_str("  (audit was cancelled before the frontier drained)\n");
    }
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");

    for (source, results) in group_by_source(&response.results) {
        report.push_str(&format!("## {}\n", source));
        report.push_str(&format!("  {} links\n\n", results.len()));

        for result in results {
            let kind = match result.link_type {
                LinkType::Internal => extract_url_path(&result.target_url),
                LinkType::External => result.target_url.clone(),
            };
            let mut line = format!("  {} {}", colorize_status(result.status), kind);

            if result.link_type == LinkType::External {
                line.push_str(&format!(" {}", "(external)".dimmed()));
            }
            if !result.rel.is_empty() {
                line.push_str(&format!(" {}", format!("rel={}", result.rel.join(" ")).dimmed()));
            }
            report.push_str(&line);
            report.push('\n');

            if result.is_redirected() {
                report.push_str(&format!("      ↳ {}\n", result.redirect_chain));
            }
            if let Some(ref error) = result.error {
                report.push_str(&format!("      ✗ {}\n", error.red()));
            }
        }
        report.push('\n');
    }

    report
}

pub fn generate_json_report(response: &AuditResponse) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Linktrail",
                "version": env!("CARGO_PKG_VERSION"),
                "run_id": uuid::Uuid::new_v4().to_string(),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": summarize(response),
            "stats": response.stats,
            "results": response.results
        }
    });

    serde_json::to_string_pretty(&json_report)
}

const CSV_HEADER: [&str; 9] = [
    "source_url",
    "target_url",
    "status",
    "type",
    "depth",
    "anchor_text",
    "rel",
    "redirect_chain",
    "error",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    source_url: &'a str,
    target_url: &'a str,
    status: u16,
    link_type: &'static str,
    depth: usize,
    anchor_text: &'a str,
    rel: String,
    redirect_chain: &'a str,
    error: &'a str,
}

impl<'a> From<&'a LinkResult> for CsvRow<'a> {
    fn from(r: &'a LinkResult) -> Self {
        Self {
            source_url: &r.source_url,
            target_url: &r.target_url,
            status: r.status,
            link_type: r.link_type.as_str(),
            depth: r.depth,
            anchor_text: &r.anchor_text,
            rel: r.rel.join(" "),
            redirect_chain: &r.redirect_chain,
            error: r.error.as_deref().unwrap_or(""),
        }
    }
}

pub fn generate_csv_report(response: &AuditResponse) -> Result<String, csv::Error> {
    // Empty audits still get a header row
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for result in &response.results {
        writer.serialize(CsvRow::from(result))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn md_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

pub fn generate_markdown_report(response: &AuditResponse) -> String {
    let summary = summarize(response);
    let mut md = String::from("# Link Audit Report\n\n");

    md.push_str("| Metric | Count |\n|---|---|\n");
    md.push_str(&format!("| Links checked | {} |\n", summary.total_links));
    md.push_str(&format!("| Internal | {} |\n", summary.internal));
    md.push_str(&format!("| External | {} |\n", summary.external));
    md.push_str(&format!("| Broken | {} |\n", summary.broken));
    md.push_str(&format!("| Redirected | {} |\n", summary.redirected));
    md.push_str(&format!("| Pages visited | {} |\n\n", summary.pages_visited));

    if response.results.is_empty() {
        md.push_str("_No links found._\n");
        return md;
    }

    md.push_str("| Source | Target | Status | Type | Chain | Error |\n");
    md.push_str("|---|---|---|---|---|---|\n");
    for r in &response.results {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            md_cell(&r.source_url),
            md_cell(&r.target_url),
            r.status,
            r.link_type.as_str(),
            md_cell(&r.redirect_chain),
            md_cell(r.error.as_deref().unwrap_or("")),
        ));
    }
    md
}
