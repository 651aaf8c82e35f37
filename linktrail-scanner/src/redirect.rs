use crate::config::CrawlConfig;
use crate::error::{ResolveError, Result};
use crate::rate_limit::RateLimiter;
use reqwest::header::LOCATION;
use reqwest::{Client, redirect::Policy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectHop {
    pub url: String,
    pub status: u16,
}

/// Terminal outcome of following a URL hop by hop.
///
/// `chain` holds every response observed, the terminal one included, so a
/// chain is empty only when the very first request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub final_status: u16,
    pub chain: Vec<RedirectHop>,
    pub error: Option<ResolveError>,
}

impl ResolveOutcome {
    /// `https://a.test/b (301) -> https://a.test/c (200)`
    pub fn format_chain(&self) -> String {
        format_chain(&self.chain)
    }
}

pub fn format_chain(chain: &[RedirectHop]) -> String {
    chain
        .iter()
        .map(|hop| format!("{} ({})", hop.url, hop.status))
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub struct RedirectResolver {
    client: Client,
    max_redirects: usize,
    throttle_hops: bool,
}

impl RedirectResolver {
    /// `client` must have automatic redirect following disabled.
    pub fn new(client: Client, max_redirects: usize) -> Self {
        Self {
            client,
            max_redirects,
            throttle_hops: false,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self::new(client, config.max_redirects)
            .with_throttled_hops(config.throttle_redirect_hops))
    }

    pub fn with_throttled_hops(mut self, throttle: bool) -> Self {
        self.throttle_hops = throttle;
        self
    }

    /// Follow `url` until a non-redirect response, a loop, the hop ceiling
    /// or a transport failure.
    ///
    /// The first request is never gated here; the caller paces link checks.
    /// When hop throttling is on, every later hop waits on `limiter`.
    pub async fn resolve(&self, url: &str, mut limiter: Option<&mut RateLimiter>) -> ResolveOutcome {
        let mut chain: Vec<RedirectHop> = Vec::new();

        let mut current = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                return ResolveOutcome {
                    final_status: 0,
                    chain,
                    error: Some(ResolveError::Transport(format!("invalid URL: {}", e))),
                };
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(current.to_string());

        loop {
            if self.throttle_hops
                && !chain.is_empty()
                && let Some(limiter) = limiter.as_deref_mut()
            {
                limiter.acquire().await;
            }

            let response = match self.client.get(current.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Transport failure at {}: {}", current, e);
                    return ResolveOutcome {
                        final_status: 0,
                        chain,
                        error: Some(ResolveError::from_transport(&e)),
                    };
                }
            };

            let status = response.status();
            chain.push(RedirectHop {
                url: current.to_string(),
                status: status.as_u16(),
            });

            if !status.is_redirection() {
                return ResolveOutcome {
                    final_status: status.as_u16(),
                    chain,
                    error: None,
                };
            }

            let next = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .and_then(|location| current.join(location).ok());

            let Some(mut next) = next else {
                debug!("{} answered {} without a usable Location", current, status);
                return ResolveOutcome {
                    final_status: status.as_u16(),
                    chain,
                    error: None,
                };
            };
            next.set_fragment(None);

            if !seen.insert(next.to_string()) {
                debug!("Redirect loop: {} -> {}", current, next);
                return ResolveOutcome {
                    final_status: status.as_u16(),
                    chain,
                    error: Some(ResolveError::RedirectLoop),
                };
            }

            if chain.len() >= self.max_redirects {
                debug!("Redirect ceiling of {} reached at {}", self.max_redirects, current);
                return ResolveOutcome {
                    final_status: status.as_u16(),
                    chain,
                    error: Some(ResolveError::TooManyRedirects),
                };
            }

            debug!("{} -> {} ({})", current, next, status);
            current = next;
        }
    }
}
