use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Linktrail/0.1 (+https://github.com/trapdoorsec/linktrail)";

/// Knobs for a single crawl invocation.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Expand internal links into new frontier pages.
    pub recursive: bool,
    /// Hard cap on the number of results produced.
    pub max_urls: usize,
    /// Pages at this depth are fetched but their links are not enqueued.
    pub max_depth: usize,
    pub requests_per_second: f64,
    /// Only expand links whose host is one of the seed hosts.
    pub same_domain_only: bool,
    pub max_redirects: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Share of the rate-limit interval waited before each link check.
    pub link_delay_fraction: f64,
    /// Also wait the rate-limit interval between hops of one redirect chain.
    pub throttle_redirect_hops: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_urls: 100,
            max_depth: 2,
            requests_per_second: 2.0,
            same_domain_only: true,
            max_redirects: 10,
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            link_delay_fraction: 0.5,
            throttle_redirect_hops: false,
        }
    }
}

impl CrawlConfig {
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_rate_limit(mut self, requests_per_second: f64) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    pub fn with_same_domain_only(mut self, same_domain_only: bool) -> Self {
        self.same_domain_only = same_domain_only;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_link_delay_fraction(mut self, fraction: f64) -> Self {
        self.link_delay_fraction = fraction;
        self
    }

    pub fn with_throttle_redirect_hops(mut self, throttle: bool) -> Self {
        self.throttle_redirect_hops = throttle;
        self
    }
}
