use crate::normalize::normalize_url;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use url::Url;

const ANCHOR_SELECTOR: &str = "a[href]";

/// An element pulled out of a parsed document, detached from the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupElement {
    pub attributes: HashMap<String, String>,
    pub text: String,
}

impl MarkupElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}

/// A parsed document that can answer CSS selector queries.
pub trait MarkupDocument {
    fn select(&self, selector: &str) -> Vec<MarkupElement>;
}

/// Markup parsing capability. Implementations must be permissive: broken
/// markup yields whatever elements can be recovered, never an error.
pub trait MarkupParser: Send + Sync {
    fn parse(&self, markup: &str) -> Box<dyn MarkupDocument>;
}

/// html5ever-backed parser from the `scraper` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

struct HtmlDocument(Html);

impl MarkupParser for HtmlParser {
    fn parse(&self, markup: &str) -> Box<dyn MarkupDocument> {
        Box::new(HtmlDocument(Html::parse_document(markup)))
    }
}

impl MarkupDocument for HtmlDocument {
    fn select(&self, selector: &str) -> Vec<MarkupElement> {
        let selector = match Selector::parse(selector) {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid selector {}: {}", selector, e);
                return Vec::new();
            }
        };

        self.0
            .select(&selector)
            .map(|element| MarkupElement {
                attributes: element
                    .value()
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                text: element.text().collect::<String>(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub target_url: String,
    pub anchor_text: String,
    pub rel: Vec<String>,
    pub is_internal: bool,
}

/// Pull every anchor out of `markup`, resolved against `page_url`.
///
/// A link is internal when its host equals the page's own host or one of
/// `seed_hosts`. Links that fail normalization are skipped. Anchors are
/// yielded in document order.
pub fn extract_links<'a>(
    parser: &dyn MarkupParser,
    markup: &str,
    page_url: &'a Url,
    seed_hosts: &'a HashSet<String>,
) -> impl Iterator<Item = DiscoveredLink> + use<'a> {
    let anchors = parser.parse(markup).select(ANCHOR_SELECTOR);
    let page_host = page_url.host_str().map(|h| h.to_string());

    anchors.into_iter().filter_map(move |anchor| {
        let href = anchor.attr("href")?;
        let Some(target) = normalize_url(href, Some(page_url)) else {
            debug!("Skipping unusable href {:?} on {}", href, page_url);
            return None;
        };

        let is_internal = target
            .host_str()
            .map(|host| page_host.as_deref() == Some(host) || seed_hosts.contains(host))
            .unwrap_or(false);

        Some(DiscoveredLink {
            target_url: target.to_string(),
            anchor_text: collapse_whitespace(&anchor.text),
            rel: anchor
                .attr("rel")
                .map(|rel| rel.split_whitespace().map(|t| t.to_string()).collect())
                .unwrap_or_default(),
            is_internal,
        })
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
