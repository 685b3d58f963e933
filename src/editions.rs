//! Built-in digest editions.
//!
//! An edition bundles the defaults that differ between the national and the
//! international digest: the feed table, whether summaries carry a
//! `GLOBAL IMPACT` line, whether a quiz is generated, the dedup state file
//! name, SMTP transport security, and the presentation strings.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::{Category, FeedSource, SmtpSecurity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    #[default]
    National,
    International,
}

/// Colour used for categories missing from an edition's palette.
pub const FALLBACK_COLOR: &str = "#6b7280";

impl Edition {
    pub fn title(self) -> &'static str {
        match self {
            Edition::National => "News Digest",
            Edition::International => "International News Digest",
        }
    }

    /// Banner line at the top of the HTML digest.
    pub fn headline(self) -> &'static str {
        match self {
            Edition::National => "📰 Your News Digest",
            Edition::International => "🌍 International News Digest",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Edition::National => "📰",
            Edition::International => "🌍",
        }
    }

    pub fn footer(self) -> &'static str {
        match self {
            Edition::National => "Generated automatically every 4 hours • Powered by AI",
            Edition::International => "🌍 Your automated international news digest • Powered by AI",
        }
    }

    pub fn state_file_name(self) -> &'static str {
        match self {
            Edition::National => "processed_urls.json",
            Edition::International => "intl_processed_urls.json",
        }
    }

    pub fn includes_global_impact(self) -> bool {
        matches!(self, Edition::International)
    }

    pub fn quiz_enabled(self) -> bool {
        matches!(self, Edition::International)
    }

    pub fn summary_max_tokens(self) -> u32 {
        match self {
            Edition::National => 300,
            Edition::International => 350,
        }
    }

    pub fn smtp_security(self) -> SmtpSecurity {
        match self {
            Edition::National => SmtpSecurity::Implicit,
            Edition::International => SmtpSecurity::Starttls,
        }
    }

    pub fn category_color(self, category: &str) -> &'static str {
        let palette: &[(&str, &str)] = match self {
            Edition::National => &[
                ("US", "#1e40af"),
                ("World", "#059669"),
                ("Middle East", "#dc2626"),
                ("Asia", "#9333ea"),
                ("Europe", "#0891b2"),
                ("Africa", "#ea580c"),
                ("Business", "#065f46"),
                ("Technology", "#4f46e5"),
            ],
            Edition::International => &[
                ("World News", "#2563eb"),
                ("Europe", "#0891b2"),
                ("Asia", "#9333ea"),
                ("Middle East", "#dc2626"),
                ("Africa", "#ea580c"),
                ("Latin America", "#059669"),
            ],
        };
        palette
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, color)| *color)
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn default_categories(self) -> Vec<Category> {
        let table: &[(&str, &[(&str, &str)])] = match self {
            Edition::National => NATIONAL_FEEDS,
            Edition::International => INTERNATIONAL_FEEDS,
        };
        table
            .iter()
            .map(|(name, sources)| Category {
                name: name.to_string(),
                sources: sources
                    .iter()
                    .map(|(name, url)| FeedSource {
                        name: name.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
            })
            .collect()
    }
}

const NATIONAL_FEEDS: &[(&str, &[(&str, &str)])] = &[
    (
        "US",
        &[
            ("CNN", "http://rss.cnn.com/rss/cnn_topstories.rss"),
            ("NPR", "https://feeds.npr.org/1001/rss.xml"),
            ("Washington Post", "https://feeds.washingtonpost.com/rss/national"),
            ("NY Times US", "https://rss.nytimes.com/services/xml/rss/nyt/US.xml"),
            ("ABC Top", "https://feeds.abcnews.com/abcnews/topstories"),
        ],
    ),
    (
        "World",
        &[
            ("BBC World", "http://feeds.bbci.co.uk/world/rss.xml"),
            ("NY World", "https://rss.nytimes.com/services/xml/rss/nyt/World.xml"),
            ("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
        ],
    ),
    (
        "Middle East",
        &[(
            "NY Middle East",
            "https://rss.nytimes.com/services/xml/rss/nyt/MiddleEast.xml",
        )],
    ),
    (
        "Asia",
        &[
            (
                "NY Asia Pacific",
                "https://rss.nytimes.com/services/xml/rss/nyt/AsiaPacific.xml",
            ),
            (
                "CNBC Asia",
                "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=19832390",
            ),
        ],
    ),
    (
        "Europe",
        &[
            ("NY Europe", "https://rss.nytimes.com/services/xml/rss/nyt/Europe.xml"),
            (
                "CNBC EU",
                "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=19794221",
            ),
        ],
    ),
    (
        "Africa",
        &[("NY Africa", "https://rss.nytimes.com/services/xml/rss/nyt/Africa.xml")],
    ),
    (
        "Business",
        &[
            (
                "CNBC Business",
                "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10001147",
            ),
            ("NY Business", "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml"),
            ("WSJ Business", "https://feeds.content.dowjones.io/public/rss/WSJcomUSBusiness"),
        ],
    ),
    (
        "Technology",
        &[
            ("NY Tech", "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml"),
            (
                "CNBC Tech",
                "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=19854910",
            ),
        ],
    ),
];

const INTERNATIONAL_FEEDS: &[(&str, &[(&str, &str)])] = &[
    (
        "World News",
        &[
            ("BBC World", "http://feeds.bbci.co.uk/news/world/rss.xml"),
            ("The Guardian International", "https://www.theguardian.com/world/rss"),
            ("AP World News", "https://apnews.com/apf-topnews"),
            (
                "ABC Intl Headlines",
                "https://feeds.abcnews.com/abcnews/internationalheadlines",
            ),
            (
                "CNBC World News",
                "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=100727362",
            ),
            ("CNN", "http://rss.cnn.com/rss/cnn_world.rss"),
        ],
    ),
    (
        "Europe",
        &[
            ("BBC Europe", "http://feeds.bbci.co.uk/news/world/europe/rss.xml"),
            ("France 24", "https://www.france24.com/en/europe/rss"),
            ("Deutsche Welle", "https://rss.dw.com/rdf/rss-en-eu"),
        ],
    ),
    (
        "Asia",
        &[
            ("BBC Asia", "http://feeds.bbci.co.uk/news/world/asia/rss.xml"),
            ("The Diplomat", "https://thediplomat.com/feed/"),
            ("Nikkei Asia", "https://asia.nikkei.com/rss/feed/nar"),
        ],
    ),
    (
        "Middle East",
        &[
            (
                "BBC Middle East",
                "http://feeds.bbci.co.uk/news/world/middle_east/rss.xml",
            ),
            ("Middle East Monitor", "https://middleeastmnt.disqus.com/latest.rss"),
            ("Middle East Eye", "https://www.middleeasteye.net/rss"),
        ],
    ),
    (
        "Africa",
        &[
            ("BBC Africa", "http://feeds.bbci.co.uk/news/world/africa/rss.xml"),
            ("France 24", "https://www.france24.com/en/africa/rss"),
        ],
    ),
    (
        "Latin America",
        &[
            (
                "BBC Latin America",
                "http://feeds.bbci.co.uk/news/world/latin_america/rss.xml",
            ),
            (
                "Latin America Affairs",
                "http://latinamericanaffairs.blogspot.com/feeds/posts/default?alt=rss",
            ),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_keep_table_order() {
        let names: Vec<String> = Edition::International
            .default_categories()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            names,
            vec!["World News", "Europe", "Asia", "Middle East", "Africa", "Latin America"]
        );
    }

    #[test]
    fn test_every_builtin_source_is_a_valid_url() {
        for edition in [Edition::National, Edition::International] {
            for category in edition.default_categories() {
                assert!(!category.sources.is_empty(), "{} has no sources", category.name);
                for source in category.sources {
                    assert!(url::Url::parse(&source.url).is_ok(), "{}", source.url);
                }
            }
        }
    }

    #[test]
    fn test_category_color_fallback() {
        assert_eq!(Edition::National.category_color("US"), "#1e40af");
        assert_eq!(Edition::National.category_color("Sports"), FALLBACK_COLOR);
        assert_eq!(Edition::International.category_color("US"), FALLBACK_COLOR);
    }

    #[test]
    fn test_headlines() {
        assert_eq!(Edition::National.headline(), "📰 Your News Digest");
        assert_eq!(Edition::International.headline(), "🌍 International News Digest");
        assert_eq!(Edition::International.category_color("World News"), "#2563eb");
        assert_eq!(Edition::International.category_color("Latin America"), "#059669");
    }

    #[test]
    fn test_edition_deserializes_lowercase() {
        let edition: Edition = serde_yaml::from_str("international").unwrap();
        assert_eq!(edition, Edition::International);
    }
}
