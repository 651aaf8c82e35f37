use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use linktrail_core::audit::{AuditOptions, AuditOutcome, AuditRequest, execute_audit, handle_request};
use linktrail_core::report::{ReportFormat, render};
use linktrail_scanner::{CancellationToken, CrawlConfig, RedirectResolver, ResolveOutcome};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use url::Url;

// Helper functions for audit handler

/// Load seeds from a hosts file, or from the `--url` arguments
pub fn load_urls_from_source(urls: &[Url], hosts_file: Option<&str>) -> Result<Vec<String>, String> {
    if let Some(hosts_file) = hosts_file {
        let expanded = shellexpand::tilde(hosts_file);
        load_urls_from_file(Path::new(expanded.as_ref()))
    } else if !urls.is_empty() {
        Ok(urls.iter().map(|u| u.as_str().to_string()).collect())
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

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

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line) {
        if url.has_host() {
            return Some(line.to_string());
        }
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

/// Install the stderr log subscriber; `-v` raises the level.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // Ignore an already-installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build an audit request from the `audit` subcommand's flags.
pub fn build_audit_request(sub_matches: &ArgMatches, urls: Vec<String>) -> AuditRequest {
    let mut request = AuditRequest::new(urls);
    request.recursive = sub_matches.get_flag("recursive");
    request.same_domain_only = !sub_matches.get_flag("any-domain");
    if let Some(max_urls) = sub_matches.get_one::<usize>("max-urls") {
        request.max_urls = *max_urls;
    }
    if let Some(max_depth) = sub_matches.get_one::<usize>("max-depth") {
        request.max_depth = *max_depth;
    }
    if let Some(rate) = sub_matches.get_one::<f64>("rate-limit") {
        request.rate_limit = *rate;
    }
    request
}

/// Cancel `token` when the user hits Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Interrupted, finishing the current page...", "!".yellow().bold());
            token.cancel();
        }
    });
}

fn read_request_body(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read request from stdin")?;
        Ok(body)
    } else {
        let expanded = shellexpand::tilde(source);
        fs::read_to_string(expanded.as_ref())
            .with_context(|| format!("Failed to read request file {}", source))
    }
}

fn write_report(report: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("{} Report saved to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}

pub async fn handle_audit(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    if let Some(source) = sub_matches.get_one::<String>("request") {
        let body = read_request_body(source)?;
        let outcome = handle_request(&body, None, cancel).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return match outcome {
            AuditOutcome::Ok(_) => Ok(()),
            AuditOutcome::ClientError { error } | AuditOutcome::ServerError { error } => {
                bail!(error)
            }
        };
    }

    let urls: Vec<Url> = sub_matches
        .get_many::<Url>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let hosts_file = sub_matches.get_one::<String>("hosts-file");
    let seeds = load_urls_from_source(&urls, hosts_file.map(String::as_str))
        .map_err(anyhow::Error::msg)?;

    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<PathBuf>("output");

    let request = build_audit_request(sub_matches, seeds);
    let mut options = AuditOptions::new(request);
    if let Some(hops) = sub_matches.get_one::<usize>("max-redirects") {
        options.max_redirects = *hops;
    }
    if let Some(secs) = sub_matches.get_one::<u64>("timeout") {
        options.request_timeout = Duration::from_secs(*secs);
    }
    options.throttle_redirect_hops = sub_matches.get_flag("throttle-hops");
    options.show_progress_bars = !quiet;

    if !quiet {
        let req = &options.request;
        eprintln!("\n🔗 Auditing {} seed(s)", req.urls.len());
        eprintln!(
            "Mode: {}",
            if req.recursive {
                format!("recursive (max depth {})", req.max_depth)
            } else {
                "seeds only".to_string()
            }
        );
        eprintln!("Max results: {}", req.max_urls);
        eprintln!("Rate limit: {} req/s", req.rate_limit);
        eprintln!(
            "Scope: {}\n",
            if req.same_domain_only {
                "seed hosts only"
            } else {
                "any host"
            }
        );
    }

    let response = execute_audit(options, None, cancel).await?;

    if !quiet {
        eprintln!("\n{} Audit complete!\n", "✓".green().bold());
    }

    let report = render(&response, format)?;
    write_report(&report, output)
}

pub fn print_resolve_outcome(url: &Url, outcome: &ResolveOutcome) {
    println!("{}", url.as_str().bright_white().bold());
    for (i, hop) in outcome.chain.iter().enumerate() {
        let marker = if i == 0 { "•" } else { "↳" };
        println!("  {} {} ({})", marker, hop.url, hop.status);
    }
    match &outcome.error {
        Some(error) => println!("  {} {}", "✗".red().bold(), error),
        None => println!("  {} final status {}", "✓".green().bold(), outcome.final_status),
    }
}

pub async fn handle_resolve(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let Some(url) = sub_matches.get_one::<Url>("URL") else {
        bail!("A URL is required");
    };
    let mut config = CrawlConfig::default();
    if let Some(hops) = sub_matches.get_one::<usize>("max-redirects") {
        config = config.with_max_redirects(*hops);
    }
    if let Some(secs) = sub_matches.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*secs));
    }

    let resolver = RedirectResolver::from_config(&config)?;
    let outcome = resolver.resolve(url.as_str(), None).await;
    print_resolve_outcome(url, &outcome);
    Ok(())
}
