use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

impl LinkType {
    pub fn from_internal(is_internal: bool) -> Self {
        if is_internal {
            LinkType::Internal
        } else {
            LinkType::External
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Internal => "internal",
            LinkType::External => "external",
        }
    }
}

/// One audited link, or one frontier page that could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResult {
    pub source_url: String,
    pub target_url: String,
    pub status: u16,
    pub redirect_chain: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub anchor_text: String,
    pub rel: Vec<String>,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl LinkResult {
    /// Result recorded when a frontier page itself could not be fetched.
    pub fn page_failure(url: String, source_url: String, depth: usize, error: String) -> Self {
        Self {
            source_url,
            target_url: url,
            status: 0,
            redirect_chain: String::new(),
            link_type: LinkType::Internal,
            anchor_text: String::new(),
            rel: Vec::new(),
            depth,
            error: Some(error),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.status == 0 || self.status >= 400
    }

    pub fn is_redirected(&self) -> bool {
        self.redirect_chain.contains(" -> ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    /// Number of results produced.
    pub total_links: usize,
    /// Final size of the visited set.
    pub visited: usize,
    /// Frontier length when the crawl stopped.
    pub remaining: usize,
    /// Links discovered on the last page but skipped because the cap was hit.
    pub unchecked: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub results: Vec<LinkResult>,
    pub stats: CrawlStats,
}
