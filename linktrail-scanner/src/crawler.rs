use crate::config::CrawlConfig;
use crate::error::{ResolveError, Result, ScanError};
use crate::extract::{DiscoveredLink, HtmlParser, MarkupParser, extract_links};
use crate::normalize::{host_of, normalize_url};
use crate::rate_limit::RateLimiter;
use crate::redirect::RedirectResolver;
use crate::result::{CrawlReport, CrawlStats, LinkResult, LinkType};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, redirect::Policy};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Progress notifications emitted while a crawl runs.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    Started { seeds: usize },
    PageStarted { url: String, depth: usize },
    PageFailed { url: String, error: String },
    PageSkipped { url: String, reason: String },
    LinkChecked { result: LinkResult },
    LinkEnqueued { url: String, depth: usize },
    Finished { stats: CrawlStats },
}

pub type EventCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;

/// A page waiting to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub url: String,
    pub depth: usize,
    pub source_url: String,
}

/// Everything owned by one crawl invocation.
struct CrawlState {
    frontier: VecDeque<FrontierItem>,
    visited: HashSet<String>,
    results: Vec<LinkResult>,
    seed_hosts: HashSet<String>,
    limiter: RateLimiter,
    unchecked: usize,
}

pub struct Crawler {
    client: Client,
    resolver: RedirectResolver,
    parser: Arc<dyn MarkupParser>,
    config: CrawlConfig,
    event_callback: Option<EventCallback>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .redirect(Policy::limited(config.max_redirects))
            .build()?;
        let resolver = RedirectResolver::from_config(&config)?;

        Ok(Self {
            client,
            resolver,
            parser: Arc::new(HtmlParser),
            config,
            event_callback: None,
        })
    }

    pub fn with_parser(mut self, parser: Arc<dyn MarkupParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub async fn crawl(&self, seeds: &[String]) -> Result<CrawlReport> {
        self.crawl_with_cancellation(seeds, CancellationToken::new())
            .await
    }

    /// Breadth-first audit starting from `seeds`.
    ///
    /// Stops when the frontier drains, the result cap is hit, or `cancel`
    /// fires. Cancellation is only observed between pages.
    pub async fn crawl_with_cancellation(
        &self,
        seeds: &[String],
        cancel: CancellationToken,
    ) -> Result<CrawlReport> {
        let mut state = self.seed_state(seeds)?;
        info!(
            "Starting crawl of {} seed(s), recursive={}, max_urls={}, max_depth={}",
            state.frontier.len(),
            self.config.recursive,
            self.config.max_urls,
            self.config.max_depth
        );
        self.emit(CrawlEvent::Started {
            seeds: state.frontier.len(),
        });

        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                info!("Crawl cancelled with {} page(s) left", state.frontier.len());
                cancelled = true;
                break;
            }
            if state.results.len() >= self.config.max_urls {
                debug!("Result cap of {} reached", self.config.max_urls);
                break;
            }
            let Some(item) = state.frontier.pop_front() else {
                break;
            };
            self.process_page(item, &mut state).await;
        }

        let stats = CrawlStats {
            total_links: state.results.len(),
            visited: state.visited.len(),
            remaining: state.frontier.len(),
            unchecked: state.unchecked,
            cancelled,
        };
        info!(
            "Crawl complete. {} link(s) checked, {} page(s) visited",
            stats.total_links, stats.visited
        );
        self.emit(CrawlEvent::Finished {
            stats: stats.clone(),
        });

        Ok(CrawlReport {
            results: state.results,
            stats,
        })
    }

    fn seed_state(&self, seeds: &[String]) -> Result<CrawlState> {
        let mut frontier = VecDeque::new();
        let mut visited = HashSet::new();
        let mut seed_hosts = HashSet::new();

        for raw in seeds {
            let Some(url) = normalize_url(raw, None) else {
                warn!("Skipping invalid seed URL {:?}", raw);
                continue;
            };
            if let Some(host) = url.host_str() {
                seed_hosts.insert(host.to_string());
            }
            let url = url.to_string();
            if visited.insert(url.clone()) {
                frontier.push_back(FrontierItem {
                    url: url.clone(),
                    depth: 0,
                    source_url: url,
                });
            }
        }

        if frontier.is_empty() {
            return Err(ScanError::InvalidUrl(
                "no valid seed URLs supplied".to_string(),
            ));
        }

        Ok(CrawlState {
            frontier,
            visited,
            results: Vec::new(),
            seed_hosts,
            limiter: RateLimiter::new(self.config.requests_per_second),
            unchecked: 0,
        })
    }

    async fn process_page(&self, item: FrontierItem, state: &mut CrawlState) {
        let page_url = match Url::parse(&item.url) {
            Ok(u) => u,
            Err(e) => {
                warn!("Frontier held unparseable URL {}: {}", item.url, e);
                return;
            }
        };

        state.limiter.acquire().await;
        debug!("Fetching {} (depth {})", item.url, item.depth);
        self.emit(CrawlEvent::PageStarted {
            url: item.url.clone(),
            depth: item.depth,
        });

        let (served_url, body) = match self.fetch_page(&page_url).await {
            Ok(Some(page)) => page,
            Ok(None) => return,
            Err(error) => {
                warn!("Failed to fetch {}: {}", item.url, error);
                self.emit(CrawlEvent::PageFailed {
                    url: item.url.clone(),
                    error: error.clone(),
                });
                state.results.push(LinkResult::page_failure(
                    item.url,
                    item.source_url,
                    item.depth,
                    error,
                ));
                return;
            }
        };

        if served_url != page_url {
            debug!("{} was served from {}", item.url, served_url);
            state.visited.insert(served_url.to_string());
        }

        let mut links = extract_links(self.parser.as_ref(), &body, &served_url, &state.seed_hosts);
        while let Some(link) = links.next() {
            if state.results.len() >= self.config.max_urls {
                state.unchecked += 1 + links.by_ref().count();
                debug!(
                    "Result cap reached on {}, {} link(s) left unchecked",
                    item.url, state.unchecked
                );
                break;
            }

            state
                .limiter
                .acquire_scaled(self.config.link_delay_fraction)
                .await;
            let outcome = self
                .resolver
                .resolve(&link.target_url, Some(&mut state.limiter))
                .await;

            let result = LinkResult {
                source_url: item.url.clone(),
                target_url: link.target_url.clone(),
                status: outcome.final_status,
                redirect_chain: outcome.format_chain(),
                link_type: LinkType::from_internal(link.is_internal),
                anchor_text: link.anchor_text.clone(),
                rel: link.rel.clone(),
                depth: item.depth,
                error: outcome.error.map(|e| e.to_string()),
            };
            debug!("{} -> {} [{}]", result.source_url, result.target_url, result.status);
            self.emit(CrawlEvent::LinkChecked {
                result: result.clone(),
            });
            state.results.push(result);

            if self.should_enqueue(&link, item.depth, &state.visited, &state.seed_hosts) {
                state.visited.insert(link.target_url.clone());
                debug!("Queuing {} at depth {}", link.target_url, item.depth + 1);
                self.emit(CrawlEvent::LinkEnqueued {
                    url: link.target_url.clone(),
                    depth: item.depth + 1,
                });
                state.frontier.push_back(FrontierItem {
                    url: link.target_url,
                    depth: item.depth + 1,
                    source_url: item.url.clone(),
                });
            }
        }
    }

    /// Fetch a frontier page, returning the URL that finally served it with
    /// the body. `Ok(None)` means the page answered but has nothing to mine
    /// for links.
    async fn fetch_page(&self, url: &Url) -> std::result::Result<Option<(Url, String)>, String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ResolveError::from_transport(&e).to_string())?;

        let served_url = response.url().clone();
        let status = response.status();
        if !status.is_success() {
            let reason = format!("page answered HTTP {}", status.as_u16());
            warn!("Not extracting links from {}: {}", url, reason);
            self.emit(CrawlEvent::PageSkipped {
                url: url.to_string(),
                reason,
            });
            return Ok(None);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase());
        if let Some(ref ct) = content_type
            && !ct.contains("html")
        {
            let reason = format!("content type {} is not markup", ct);
            debug!("Not extracting links from {}: {}", url, reason);
            self.emit(CrawlEvent::PageSkipped {
                url: url.to_string(),
                reason,
            });
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::from_transport(&e).to_string())?;
        Ok(Some((served_url, body)))
    }

    fn should_enqueue(
        &self,
        link: &DiscoveredLink,
        depth: usize,
        visited: &HashSet<String>,
        seed_hosts: &HashSet<String>,
    ) -> bool {
        if !self.config.recursive || !link.is_internal || depth >= self.config.max_depth {
            return false;
        }
        if visited.contains(&link.target_url) {
            return false;
        }
        if self.config.same_domain_only {
            let in_scope = host_of(&link.target_url).is_some_and(|h| seed_hosts.contains(&h));
            if !in_scope {
                debug!("  -> {} is outside the seed domains, not queuing", link.target_url);
                return false;
            }
        }
        true
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(&event);
        }
    }
}
