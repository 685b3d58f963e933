//! Data models flowing through the digest pipeline.
//!
//! - [`Source`]: one named feed endpoint inside a category
//! - [`FeedEntry`]: an item as listed by a feed, before any article fetch
//! - [`ArticleRecord`]: an accepted article, later given a summary
//! - [`QuizQuestion`]: one multiple-choice question parsed from model output
//! - [`Digest`]: everything the renderer needs for one edition

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A named feed endpoint belonging to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub category: String,
    pub name: String,
    pub endpoint: String,
}

/// An entry as listed by a feed.
///
/// The link is the entry's identifier for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
}

impl FeedEntry {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
        }
    }

    /// The dedup key for this entry, or `None` when the link is blank.
    pub fn identifier(&self) -> Option<&str> {
        let link = self.link.trim();
        (!link.is_empty()).then_some(link)
    }
}

/// An article accepted by the collector.
///
/// `text` is already truncated to the configured body budget. `summary` is
/// filled in once by the summarizer stage and left `None` when the model
/// output was unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub category: String,
    pub source: String,
    pub title: String,
    pub url: String,
    pub text: String,
    pub summary: Option<String>,
}

/// A multiple-choice question as parsed from the model's quiz output.
///
/// Parsing is permissive, so a question may carry fewer than four options or
/// an empty/unexpected answer label. Use [`QuizQuestion::is_well_formed`] to
/// tell the two apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: Vec::new(),
            answer: String::new(),
        }
    }

    /// Exactly four options and an answer label in `A..=D`.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == 4 && matches!(self.answer.as_str(), "A" | "B" | "C" | "D")
    }
}

/// Articles of one category, in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub articles: Vec<ArticleRecord>,
}

/// One rendered edition: grouped articles plus the optional quiz.
#[derive(Debug, Clone)]
pub struct Digest {
    pub generated_at: DateTime<Local>,
    pub groups: Vec<CategoryGroup>,
    pub quiz: Vec<QuizQuestion>,
}

impl Digest {
    /// Group `articles` by category. Categories keep the order in which they
    /// first appear; articles keep their relative order.
    pub fn assemble(articles: Vec<ArticleRecord>, generated_at: DateTime<Local>) -> Self {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for article in articles {
            match groups.iter_mut().find(|g| g.category == article.category) {
                Some(group) => group.articles.push(article),
                None => groups.push(CategoryGroup {
                    category: article.category.clone(),
                    articles: vec![article],
                }),
            }
        }
        Self {
            generated_at,
            groups,
            quiz: Vec::new(),
        }
    }

    pub fn with_quiz(mut self, quiz: Vec<QuizQuestion>) -> Self {
        self.quiz = quiz;
        self
    }

    pub fn article_count(&self) -> usize {
        self.articles().count()
    }

    pub fn articles(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.groups.iter().flat_map(|g| g.articles.iter())
    }
}
