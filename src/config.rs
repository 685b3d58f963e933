//! Run configuration.
//!
//! A [`Config`] is loaded from an optional YAML file, then adjusted by CLI
//! flags and environment variables in `main`. Every field has a default, so
//! an empty file (or no file) yields a working national edition. Settings
//! that differ per edition are `Option`s resolved through accessor methods.
//!
//! ```yaml
//! edition: international
//! categories:
//!   - name: Europe
//!     sources:
//!       - name: BBC Europe
//!         url: http://feeds.bbci.co.uk/news/world/europe/rss.xml
//! collector:
//!   per_source_limit: 10
//! model:
//!   base_url: http://127.0.0.1:8080
//! mail:
//!   from: digest@example.com
//!   recipients: [reader@example.com]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

use crate::editions::Edition;
use crate::error::{Error, Result};
use crate::models::Source;

/// One feed endpoint as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// A named, ordered group of feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub sources: Vec<FeedSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub edition: Edition,
    /// Empty means the edition's built-in feed table.
    pub categories: Vec<Category>,
    /// Dedup state file; defaults to the edition's file name.
    pub state_file: Option<PathBuf>,
    pub collector: CollectorSettings,
    pub http: HttpSettings,
    pub model: ModelSettings,
    pub quiz: QuizSettings,
    pub mail: MailSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Feed entries considered per source.
    pub per_source_limit: usize,
    /// Articles must have strictly more words than this.
    pub min_word_count: usize,
    /// Trimmed article text must have strictly more characters than this.
    pub min_char_count: usize,
    /// Accepted article text is cut to this many characters.
    pub max_body_chars: usize,
    /// Pause after each article fetch within a source.
    pub fetch_delay_ms: u64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            per_source_limit: 10,
            min_word_count: 100,
            min_char_count: 200,
            max_body_chars: 3000,
            fetch_delay_ms: 200,
        }
    }
}

impl CollectorSettings {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; news_digest/0.1)".to_string(),
            timeout_secs: 15,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Local completion server and sampling parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Base URL of a llama.cpp-compatible server.
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    /// Defaults to the edition's budget.
    pub summary_max_tokens: Option<u32>,
    pub quiz_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            temperature: 0.3,
            top_p: 0.9,
            summary_max_tokens: None,
            quiz_max_tokens: 500,
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Defaults to whether the edition carries a quiz.
    pub enabled: Option<bool>,
    /// Character budget for the aggregated summaries in the quiz prompt.
    pub prompt_budget: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            enabled: None,
            prompt_budget: 4000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (usually port 587).
    Starttls,
    /// TLS from the first byte (usually port 465).
    Implicit,
}

impl SmtpSecurity {
    pub fn default_port(self) -> u16 {
        match self {
            SmtpSecurity::Starttls => 587,
            SmtpSecurity::Implicit => 465,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: Option<u16>,
    pub security: Option<SmtpSecurity>,
    /// Sender address, also the SMTP username unless one is given.
    pub from: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipients: Vec<String>,
    /// Pause between recipients.
    pub send_delay_ms: u64,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: None,
            security: None,
            from: None,
            username: None,
            password: None,
            recipients: Vec::new(),
            send_delay_ms: 1000,
        }
    }
}

impl MailSettings {
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

impl Config {
    /// Load a YAML configuration file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!(
            edition = ?config.edition,
            categories = config.categories.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to `()`, not to a defaulted struct.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Configured categories, or the edition's built-in feed table.
    pub fn categories(&self) -> Vec<Category> {
        if self.categories.is_empty() {
            self.edition.default_categories()
        } else {
            self.categories.clone()
        }
    }

    /// All sources flattened in configuration order.
    pub fn sources(&self) -> Vec<Source> {
        self.categories()
            .into_iter()
            .flat_map(|category| {
                let Category { name, sources } = category;
                sources.into_iter().map(move |s| Source {
                    category: name.clone(),
                    name: s.name,
                    endpoint: s.url,
                })
            })
            .collect()
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.edition.state_file_name()))
    }

    pub fn quiz_enabled(&self) -> bool {
        self.quiz.enabled.unwrap_or(self.edition.quiz_enabled())
    }

    pub fn summary_max_tokens(&self) -> u32 {
        self.model
            .summary_max_tokens
            .unwrap_or(self.edition.summary_max_tokens())
    }

    pub fn smtp_security(&self) -> SmtpSecurity {
        self.mail.security.unwrap_or(self.edition.smtp_security())
    }

    pub fn smtp_port(&self) -> u16 {
        self.mail
            .smtp_port
            .unwrap_or(self.smtp_security().default_port())
    }

    /// Presence checks only. Mail settings are checked when `deliver` is set.
    pub fn validate(&self, deliver: bool) -> Result<()> {
        let sources = self.sources();
        if sources.is_empty() {
            return Err(Error::Config("no feed sources configured".to_string()));
        }
        for source in &sources {
            if source.category.trim().is_empty() || source.name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "source {} needs a category and a name",
                    source.endpoint
                )));
            }
            let url = Url::parse(&source.endpoint).map_err(|e| {
                Error::Config(format!("invalid feed url {}: {e}", source.endpoint))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "feed url {} must be http or https",
                    source.endpoint
                )));
            }
        }
        if self.collector.per_source_limit == 0 || self.collector.max_body_chars == 0 {
            return Err(Error::Config(
                "per_source_limit and max_body_chars must be positive".to_string(),
            ));
        }
        Url::parse(&self.model.base_url)
            .map_err(|e| Error::Config(format!("invalid model base_url: {e}")))?;

        if deliver {
            if self.mail.from.as_deref().is_none_or(|f| f.trim().is_empty()) {
                return Err(Error::Config("mail.from is required to send".to_string()));
            }
            if self.mail.recipients.is_empty() {
                return Err(Error::Config("at least one recipient is required".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_national_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.edition, Edition::National);
        assert_eq!(config.collector, CollectorSettings::default());
        assert_eq!(config.state_file(), PathBuf::from("processed_urls.json"));
        assert!(!config.quiz_enabled());
        assert_eq!(config.summary_max_tokens(), 300);
        assert_eq!(config.smtp_security(), SmtpSecurity::Implicit);
        assert_eq!(config.smtp_port(), 465);
        assert!(!config.sources().is_empty());
    }

    #[test]
    fn test_international_edition_defaults() {
        let config = Config::from_yaml("edition: international\n").unwrap();
        assert_eq!(config.state_file(), PathBuf::from("intl_processed_urls.json"));
        assert!(config.quiz_enabled());
        assert_eq!(config.summary_max_tokens(), 350);
        assert_eq!(config.smtp_port(), 587);
        assert_eq!(config.sources()[0].category, "World News");
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
edition: international
state_file: /var/lib/digest/seen.json
categories:
  - name: Tech
    sources:
      - name: One
        url: https://one.example/rss
      - name: Two
        url: https://two.example/rss
  - name: Science
    sources:
      - name: Three
        url: https://three.example/atom
collector:
  per_source_limit: 5
quiz:
  enabled: false
mail:
  smtp_port: 2525
  from: digest@example.com
  recipients: [a@example.com, b@example.com]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.collector.per_source_limit, 5);
        assert_eq!(config.collector.min_word_count, 100);
        assert!(!config.quiz_enabled());
        assert_eq!(config.smtp_port(), 2525);
        assert_eq!(config.state_file(), PathBuf::from("/var/lib/digest/seen.json"));

        let sources = config.sources();
        let names: Vec<(&str, &str)> = sources
            .iter()
            .map(|s| (s.category.as_str(), s.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("Tech", "One"), ("Tech", "Two"), ("Science", "Three")]
        );
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let yaml = r#"
categories:
  - name: Tech
    sources:
      - name: Broken
        url: "not a url"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert!(matches!(config.validate(false), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_requires_mail_only_when_delivering() {
        let config = Config::default();
        assert!(config.validate(false).is_ok());
        assert!(matches!(config.validate(true), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "collector:\n  max_body_chars: 1200\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.collector.max_body_chars, 1200);
    }

    #[test]
    fn test_unknown_edition_is_an_error() {
        assert!(matches!(
            Config::from_yaml("edition: regional\n"),
            Err(Error::Yaml(_))
        ));
    }
}
