//! Incremental article collection.
//!
//! Sources are visited in configuration order and each feed contributes at
//! most `per_source_limit` entries. An entry whose link is already in the
//! dedup set is skipped before any article fetch. Fetched articles that are
//! too short are remembered as seen so they are never fetched again, while
//! fetch failures are left out of the set and retried on the next run.

use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::config::CollectorSettings;
use crate::extract::ContentExtractor;
use crate::feeds::FeedReader;
use crate::models::{ArticleRecord, Source};
use crate::utils::{truncate_chars, word_count};

/// Result of one collection pass.
#[derive(Debug, Default)]
pub struct CollectionReport {
    /// Accepted articles in source order, then feed order.
    pub articles: Vec<ArticleRecord>,
    /// Fetched but rejected as too short.
    pub skipped: usize,
    /// Article fetches that failed (not marked as seen).
    pub failed: usize,
    /// Sources whose feed could not be read.
    pub failed_sources: usize,
}

/// Why fetched text was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooFewWords(usize),
    TooFewChars(usize),
}

/// Apply the word and character thresholds to fetched text.
pub fn check_quality(text: &str, settings: &CollectorSettings) -> Result<(), Rejection> {
    let words = word_count(text);
    if words <= settings.min_word_count {
        return Err(Rejection::TooFewWords(words));
    }
    let chars = text.trim().chars().count();
    if chars <= settings.min_char_count {
        return Err(Rejection::TooFewChars(chars));
    }
    Ok(())
}

/// Collect new articles from `sources`, updating `seen` in place.
#[instrument(level = "info", skip_all, fields(sources = sources.len(), seen = seen.len()))]
pub async fn collect<F, E>(
    feeds: &F,
    extractor: &E,
    sources: &[Source],
    seen: &mut HashSet<String>,
    settings: &CollectorSettings,
) -> CollectionReport
where
    F: FeedReader,
    E: ContentExtractor,
{
    let mut report = CollectionReport::default();

    for source in sources {
        let entries = match feeds.read_feed(&source.endpoint).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = %source.name, error = %e, "Failed to read feed; skipping source");
                report.failed_sources += 1;
                continue;
            }
        };

        for entry in entries.iter().take(settings.per_source_limit) {
            let Some(url) = entry.identifier() else {
                continue;
            };
            if seen.contains(url) {
                continue;
            }

            match extractor.extract(url).await {
                Ok(text) => match check_quality(&text, settings) {
                    Ok(()) => {
                        info!(
                            source = %source.name,
                            title = %truncate_chars(&entry.title, 60),
                            words = word_count(&text),
                            "Collected article"
                        );
                        seen.insert(url.to_string());
                        report.articles.push(ArticleRecord {
                            category: source.category.clone(),
                            source: source.name.clone(),
                            title: entry.title.clone(),
                            url: url.to_string(),
                            text: truncate_chars(&text, settings.max_body_chars).to_string(),
                            summary: None,
                        });
                    }
                    Err(rejection) => {
                        info!(
                            source = %source.name,
                            title = %truncate_chars(&entry.title, 50),
                            ?rejection,
                            "Skipped short article"
                        );
                        seen.insert(url.to_string());
                        report.skipped += 1;
                    }
                },
                Err(e) => {
                    warn!(source = %source.name, %url, error = %e, "Failed to fetch article");
                    report.failed += 1;
                }
            }

            sleep(settings.fetch_delay()).await;
        }
    }

    info!(
        collected = report.articles.len(),
        skipped = report.skipped,
        failed = report.failed,
        failed_sources = report.failed_sources,
        "Collection finished"
    );
    report
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory feeds and article pages.

    use super::*;
    use crate::error::{Error, Result};
    use crate::models::FeedEntry;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct StaticFeeds {
        pub feeds: HashMap<String, Vec<FeedEntry>>,
    }

    impl StaticFeeds {
        pub fn with(mut self, endpoint: &str, links: &[&str]) -> Self {
            self.feeds.insert(
                endpoint.to_string(),
                links
                    .iter()
                    .map(|l| FeedEntry::new(*l, format!("Title for {l}")))
                    .collect(),
            );
            self
        }
    }

    impl FeedReader for StaticFeeds {
        async fn read_feed(&self, endpoint: &str) -> Result<Vec<FeedEntry>> {
            self.feeds.get(endpoint).cloned().ok_or_else(|| Error::Feed {
                endpoint: endpoint.to_string(),
                reason: "connection reset".to_string(),
            })
        }
    }

    /// Serves canned bodies; unknown URLs fail. Records every fetch.
    #[derive(Debug, Default)]
    pub struct StaticPages {
        pub pages: HashMap<String, String>,
        pub fetched: RefCell<Vec<String>>,
    }

    impl StaticPages {
        pub fn with(mut self, url: &str, body: String) -> Self {
            self.pages.insert(url.to_string(), body);
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetched.borrow().len()
        }
    }

    impl ContentExtractor for StaticPages {
        async fn extract(&self, url: &str) -> Result<String> {
            self.fetched.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| Error::Extraction {
                url: url.to_string(),
                reason: "paywalled".to_string(),
            })
        }
    }

    /// `n` words of running text.
    pub fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    pub fn source(category: &str, name: &str) -> Source {
        Source {
            category: category.to_string(),
            name: name.to_string(),
            endpoint: format!("feed://{name}"),
        }
    }

    pub fn settings() -> CollectorSettings {
        CollectorSettings {
            fetch_delay_ms: 0,
            ..CollectorSettings::default()
        }
    }
}
