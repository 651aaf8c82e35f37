use indicatif::{ProgressBar, ProgressStyle};
use linktrail_scanner::{
    CancellationToken, CrawlConfig, CrawlEvent, Crawler, EventCallback, LinkResult, ScanError,
    normalize::normalize_url,
    result::{CrawlReport, CrawlStats},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

fn default_max_urls() -> usize {
    100
}

fn default_max_depth() -> usize {
    2
}

fn default_rate_limit() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

/// Audit request as received from a front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub urls: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,
    #[serde(default = "default_true")]
    pub same_domain_only: bool,
}

impl AuditRequest {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            recursive: false,
            max_urls: default_max_urls(),
            max_depth: default_max_depth(),
            rate_limit: default_rate_limit(),
            same_domain_only: true,
        }
    }

    /// Parse a JSON request body. Missing or malformed `urls` is rejected
    /// before anything else is looked at.
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| RequestError::Malformed(e.to_string()))?;

        match value.get("urls") {
            None | Some(serde_json::Value::Null) => return Err(RequestError::MissingUrls),
            Some(serde_json::Value::Array(items)) if items.iter().all(|i| i.is_string()) => {}
            Some(_) => return Err(RequestError::MalformedUrls),
        }

        serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))
    }

    /// Check the request and return its normalized, deduplicated seeds.
    pub fn validate(&self) -> Result<Vec<String>, RequestError> {
        if self.urls.is_empty() {
            return Err(RequestError::MissingUrls);
        }
        if !self.rate_limit.is_finite() || self.rate_limit <= 0.0 {
            return Err(RequestError::InvalidRateLimit(self.rate_limit));
        }
        if self.max_urls == 0 {
            return Err(RequestError::InvalidMaxUrls);
        }

        let mut seeds: Vec<String> = Vec::new();
        for raw in &self.urls {
            match normalize_url(raw, None) {
                Some(url) => {
                    let url = url.to_string();
                    if !seeds.contains(&url) {
                        seeds.push(url);
                    }
                }
                None => warn!("Dropping invalid seed URL {:?}", raw),
            }
        }

        if seeds.is_empty() {
            return Err(RequestError::NoValidUrls);
        }
        Ok(seeds)
    }

    /// Layer the request's fields over `base`.
    pub fn apply_to(&self, base: CrawlConfig) -> CrawlConfig {
        base.with_recursive(self.recursive)
            .with_max_urls(self.max_urls)
            .with_max_depth(self.max_depth)
            .with_rate_limit(self.rate_limit)
            .with_same_domain_only(self.same_domain_only)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("`urls` is required and must not be empty")]
    MissingUrls,

    #[error("`urls` must be an array of strings")]
    MalformedUrls,

    #[error("`urls` contains no valid http(s) URL")]
    NoValidUrls,

    #[error("`rateLimit` must be a positive number, got {0}")]
    InvalidRateLimit(f64),

    #[error("`maxUrls` must be at least 1")]
    InvalidMaxUrls,

    #[error("malformed request: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResponse {
    pub results: Vec<LinkResult>,
    pub stats: CrawlStats,
}

impl From<CrawlReport> for AuditResponse {
    fn from(report: CrawlReport) -> Self {
        Self {
            results: report.results,
            stats: report.stats,
        }
    }
}

/// What a front end hands back for one request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    Ok(AuditResponse),
    ClientError { error: String },
    ServerError { error: String },
}

/// Options for configuring an audit run
pub struct AuditOptions {
    pub request: AuditRequest,
    pub max_redirects: usize,
    pub request_timeout: Duration,
    pub throttle_redirect_hops: bool,
    pub show_progress_bars: bool,
}

impl AuditOptions {
    pub fn new(request: AuditRequest) -> Self {
        let defaults = CrawlConfig::default();
        Self {
            request,
            max_redirects: defaults.max_redirects,
            request_timeout: defaults.request_timeout,
            throttle_redirect_hops: defaults.throttle_redirect_hops,
            show_progress_bars: false,
        }
    }

    pub fn crawl_config(&self) -> CrawlConfig {
        self.request.apply_to(
            CrawlConfig::default()
                .with_max_redirects(self.max_redirects)
                .with_timeout(self.request_timeout)
                .with_throttle_redirect_hops(self.throttle_redirect_hops),
        )
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

/// Validate and run an audit.
///
/// Validation failures are returned before any request is sent. Per-link
/// failures never surface here; they live in the individual results.
pub async fn execute_audit(
    options: AuditOptions,
    event_callback: Option<EventCallback>,
    cancel: CancellationToken,
) -> Result<AuditResponse, AuditError> {
    let seeds = options.request.validate()?;
    let config = options.crawl_config();

    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting audit...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let checked = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let checked_clone = checked.clone();
    let callback: EventCallback = Arc::new(move |event: &CrawlEvent| {
        if let Some(ref pb) = pb_clone {
            match event {
                CrawlEvent::PageStarted { url, depth } => {
                    pb.set_message(format!(
                        "Auditing {} (depth {}), {} links checked",
                        extract_url_path(url),
                        depth,
                        checked_clone.load(Ordering::Relaxed)
                    ));
                }
                CrawlEvent::LinkChecked { .. } => {
                    checked_clone.fetch_add(1, Ordering::Relaxed);
                    pb.tick();
                }
                _ => {}
            }
        }
        if let Some(ref cb) = event_callback {
            cb(event);
        }
    });

    let crawler = Crawler::new(config)?.with_event_callback(callback);
    let report = crawler.crawl_with_cancellation(&seeds, cancel).await;

    if let Some(ref pb) = progress_bar {
        let total = checked.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Audit complete! {} links checked", total));
    }

    Ok(report?.into())
}

/// Run a JSON request end to end and wrap the answer in a tagged outcome.
pub async fn handle_request(
    body: &str,
    event_callback: Option<EventCallback>,
    cancel: CancellationToken,
) -> AuditOutcome {
    let request = match AuditRequest::from_json(body) {
        Ok(request) => request,
        Err(e) => {
            return AuditOutcome::ClientError {
                error: e.to_string(),
            };
        }
    };

    match execute_audit(AuditOptions::new(request), event_callback, cancel).await {
        Ok(response) => AuditOutcome::Ok(response),
        Err(AuditError::Request(e)) => AuditOutcome::ClientError {
            error: e.to_string(),
        },
        Err(AuditError::Scan(ScanError::InvalidUrl(e))) => AuditOutcome::ClientError { error: e },
        Err(AuditError::Scan(e)) => AuditOutcome::ServerError {
            error: e.to_string(),
        },
    }
}
