//! `check-feeds`: probe every configured source and report which ones
//! still serve a usable feed.
//!
//! The report is diagnostic only. Nothing is collected and dedup state is
//! never touched.

use itertools::Itertools;
use std::fmt;
use tracing::{info, instrument};

use crate::feeds::{FeedFetch, HttpFeedReader};
use crate::models::Source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedHealth {
    /// Parsed, with this many entries.
    Valid(usize),
    /// Parsed, but there were no entries.
    Empty,
    /// Body was neither RSS nor Atom.
    Invalid,
    HttpStatus(u16),
    RequestFailed(String),
}

impl FeedHealth {
    pub fn is_valid(&self) -> bool {
        matches!(self, FeedHealth::Valid(_))
    }
}

impl fmt::Display for FeedHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedHealth::Valid(n) => write!(f, "✅ Valid ({n} entries)"),
            FeedHealth::Empty => write!(f, "⚠️  Empty"),
            FeedHealth::Invalid => write!(f, "❌ Invalid feed format"),
            FeedHealth::HttpStatus(code) => write!(f, "❌ HTTP {code}"),
            FeedHealth::RequestFailed(reason) => write!(f, "❌ Request failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedCheck {
    pub source: Source,
    pub health: FeedHealth,
}

/// Probe sources one after another, in configuration order.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn check_feeds(reader: &HttpFeedReader, sources: &[Source]) -> Vec<FeedCheck> {
    let mut checks = Vec::with_capacity(sources.len());
    for source in sources {
        let health = match reader.fetch(&source.endpoint).await {
            Ok(FeedFetch::Parsed(entries)) if entries.is_empty() => FeedHealth::Empty,
            Ok(FeedFetch::Parsed(entries)) => FeedHealth::Valid(entries.len()),
            Ok(FeedFetch::Status(code)) => FeedHealth::HttpStatus(code),
            Ok(FeedFetch::NotAFeed) => FeedHealth::Invalid,
            Err(e) => FeedHealth::RequestFailed(e.to_string()),
        };
        info!(source = %source.name, %health, "Checked feed");
        checks.push(FeedCheck {
            source: source.clone(),
            health,
        });
    }
    checks
}

/// Human-readable report grouped by category, with a closing tally.
pub fn render_report(checks: &[FeedCheck]) -> String {
    let mut out = String::new();
    for (category, group) in &checks.iter().chunk_by(|c| c.source.category.as_str()) {
        out.push_str(&format!("\n{category}\n{}\n", "-".repeat(category.chars().count())));
        for check in group {
            out.push_str(&format!(
                "  {}: {}\n    {}\n",
                check.source.name, check.health, check.source.endpoint
            ));
        }
    }
    let valid = checks.iter().filter(|c| c.health.is_valid()).count();
    out.push_str(&format!("\n{valid}/{} feeds valid\n", checks.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>https://x</link><description>d</description>
<item><title>One</title><link>https://x/1</link></item>
<item><title>Two</title><link>https://x/2</link></item>
</channel></rss>"#;

    const EMPTY_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>https://x</link><description>d</description></channel></rss>"#;

    fn source(category: &str, name: &str, endpoint: String) -> Source {
        Source {
            category: category.to_string(),
            name: name.to_string(),
            endpoint,
        }
    }

    #[tokio::test]
    async fn test_classifies_each_feed() {
        let server = MockServer::start().await;
        for (route, response) in [
            ("/ok", ResponseTemplate::new(200).set_body_string(RSS)),
            ("/empty", ResponseTemplate::new(200).set_body_string(EMPTY_RSS)),
            ("/html", ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>")),
            ("/gone", ResponseTemplate::new(404)),
        ] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(response)
                .mount(&server)
                .await;
        }

        let sources = vec![
            source("World", "ok", format!("{}/ok", server.uri())),
            source("World", "empty", format!("{}/empty", server.uri())),
            source("Tech", "html", format!("{}/html", server.uri())),
            source("Tech", "gone", format!("{}/gone", server.uri())),
            source("Tech", "down", "http://127.0.0.1:1/feed".to_string()),
        ];
        let reader = HttpFeedReader::new(&HttpSettings::default()).unwrap();
        let checks = check_feeds(&reader, &sources).await;

        let health: Vec<&FeedHealth> = checks.iter().map(|c| &c.health).collect();
        assert_eq!(health[0], &FeedHealth::Valid(2));
        assert_eq!(health[1], &FeedHealth::Empty);
        assert_eq!(health[2], &FeedHealth::Invalid);
        assert_eq!(health[3], &FeedHealth::HttpStatus(404));
        assert!(matches!(health[4], FeedHealth::RequestFailed(_)));

        let report = render_report(&checks);
        assert!(report.contains("\nWorld\n-----\n  ok: ✅ Valid (2 entries)\n"));
        assert!(report.contains("\nTech\n----\n  html: ❌ Invalid feed format\n"));
        assert!(report.contains("gone: ❌ HTTP 404"));
        assert!(report.ends_with("\n1/5 feeds valid\n"));
    }
}
