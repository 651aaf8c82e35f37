pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod rate_limit;
pub mod redirect;
pub mod result;

pub use config::CrawlConfig;
pub use crawler::{CrawlEvent, Crawler, EventCallback, FrontierItem};
pub use error::{ResolveError, ScanError};
pub use extract::{DiscoveredLink, HtmlParser, MarkupDocument, MarkupParser};
pub use redirect::{RedirectHop, RedirectResolver, ResolveOutcome};
pub use result::{CrawlReport, CrawlStats, LinkResult, LinkType};

// Token accepted by `Crawler::crawl_with_cancellation`
pub use tokio_util::sync::CancellationToken;
