//! Feed reading.
//!
//! [`FeedReader`] is the seam the collector depends on. [`HttpFeedReader`]
//! downloads a feed document and parses it as RSS 2.0, falling back to Atom.
//! A document that is neither yields no entries instead of an error, so one
//! broken feed never looks different from an empty one to the collector.

use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::HttpSettings;
use crate::error::{Error, Result};
use crate::models::FeedEntry;

/// Lists the entries of one feed endpoint, in feed order.
pub trait FeedReader {
    async fn read_feed(&self, endpoint: &str) -> Result<Vec<FeedEntry>>;
}

/// Outcome of downloading a feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFetch {
    Parsed(Vec<FeedEntry>),
    /// The server answered with a non-success status.
    Status(u16),
    /// The body was neither RSS nor Atom.
    NotAFeed,
}

#[derive(Debug, Clone)]
pub struct HttpFeedReader {
    client: Client,
}

impl HttpFeedReader {
    pub fn new(http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(http.timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Download and classify a feed document. Transport failures are errors.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, endpoint: &str) -> Result<FeedFetch> {
        let response = self.client.get(endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(FeedFetch::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(match parse_feed(&body) {
            Some(entries) => FeedFetch::Parsed(entries),
            None => FeedFetch::NotAFeed,
        })
    }
}

impl FeedReader for HttpFeedReader {
    async fn read_feed(&self, endpoint: &str) -> Result<Vec<FeedEntry>> {
        match self.fetch(endpoint).await? {
            FeedFetch::Parsed(entries) => {
                debug!(endpoint, count = entries.len(), "Parsed feed");
                Ok(entries)
            }
            FeedFetch::Status(code) => Err(Error::Feed {
                endpoint: endpoint.to_string(),
                reason: format!("HTTP {code}"),
            }),
            FeedFetch::NotAFeed => {
                warn!(endpoint, "Document is neither RSS nor Atom; treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

/// Parse an RSS 2.0 or Atom document. `None` when it is neither.
///
/// Entries without a link are dropped since they cannot be deduplicated.
pub fn parse_feed(bytes: &[u8]) -> Option<Vec<FeedEntry>> {
    if let Ok(channel) = rss::Channel::read_from(bytes) {
        return Some(
            channel
                .items()
                .iter()
                .filter_map(|item| {
                    let link = item.link()?.trim();
                    (!link.is_empty()).then(|| {
                        FeedEntry::new(link, item.title().unwrap_or_default().trim())
                    })
                })
                .collect(),
        );
    }

    if let Ok(feed) = atom_syndication::Feed::read_from(bytes) {
        return Some(
            feed.entries()
                .iter()
                .filter_map(|entry| {
                    let links = entry.links();
                    let link = links
                        .iter()
                        .find(|l| l.rel() == "alternate")
                        .or_else(|| links.first())?;
                    let href = link.href().trim();
                    (!href.is_empty())
                        .then(|| FeedEntry::new(href, entry.title().value.trim()))
                })
                .collect(),
        );
    }

    None
}
