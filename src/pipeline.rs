//! One digest run, end to end.
//!
//! 1. **Collect**: load dedup state, gather new articles, persist state
//! 2. **Summarize**: one completion per article, strictly in order
//! 3. **Quiz**: one completion over all summaries (when enabled)
//! 4. **Render**: HTML plus a plain-text alternative, optionally archived
//! 5. **Deliver**: one email per recipient
//!
//! Collaborators are passed in so the whole run can execute against fakes.

use chrono::Local;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::api::Completion;
use crate::collector::collect;
use crate::config::Config;
use crate::dedup::DedupStore;
use crate::error::Result;
use crate::extract::ContentExtractor;
use crate::feeds::FeedReader;
use crate::mailer::{DeliveryReport, DigestMessage, Mailer, dispatch, subject};
use crate::models::Digest;
use crate::outputs::{archive, html};
use crate::quiz::QuizGenerator;
use crate::summarizer::Summarizer;
use crate::utils::truncate_chars;

/// External services a run talks to.
pub struct Collaborators<'a, F, E, C, M> {
    pub feeds: &'a F,
    pub extractor: &'a E,
    pub llm: &'a C,
    /// `None` renders the digest without sending it.
    pub mailer: Option<&'a M>,
}

#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Directory for a dated copy of the rendered HTML.
    pub html_output: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub collected: usize,
    pub skipped: usize,
    pub failed: usize,
    pub summarized: usize,
    pub quiz_questions: usize,
    pub archived: Option<PathBuf>,
    /// `None` when nothing was sent (no articles, or no mailer).
    pub delivery: Option<DeliveryReport>,
}

#[instrument(level = "info", skip_all, fields(edition = ?config.edition))]
pub async fn run<F, E, C, M>(
    config: &Config,
    collaborators: Collaborators<'_, F, E, C, M>,
    options: &RunOptions,
) -> Result<RunSummary>
where
    F: FeedReader,
    E: ContentExtractor,
    C: Completion,
    M: Mailer,
{
    let start_time = Instant::now();
    let mut summary = RunSummary::default();

    // ---- Collect ----
    let store = DedupStore::new(config.state_file());
    let mut seen = store.load().await?;
    let report = collect(
        collaborators.feeds,
        collaborators.extractor,
        &config.sources(),
        &mut seen,
        &config.collector,
    )
    .await;
    if let Err(e) = store.save(&seen).await {
        error!(path = %store.path().display(), error = %e, "Failed to save dedup state");
        return Err(e);
    }

    summary.collected = report.articles.len();
    summary.skipped = report.skipped;
    summary.failed = report.failed;

    let mut articles = report.articles;
    if articles.is_empty() {
        info!("No new articles found; nothing to send");
        return Ok(summary);
    }

    // ---- Summarize ----
    let summarizer = Summarizer::new(
        collaborators.llm,
        config.summary_max_tokens(),
        config.model.temperature,
        config.model.top_p,
        config.edition.includes_global_impact(),
    );
    let total = articles.len();
    for (i, article) in articles.iter_mut().enumerate() {
        info!(
            index = i + 1,
            total,
            title = %truncate_chars(&article.title, 60),
            "Summarizing article"
        );
        article.summary = summarizer.summarize(&article.text).await;
        if article.summary.is_some() {
            summary.summarized += 1;
        }
    }
    info!(summarized = summary.summarized, total, "Summaries finished");

    let mut digest = Digest::assemble(articles, Local::now());

    // ---- Quiz ----
    if config.quiz_enabled() {
        let generator = QuizGenerator::new(
            collaborators.llm,
            config.model.quiz_max_tokens,
            config.model.temperature,
            config.model.top_p,
            config.quiz.prompt_budget,
        );
        let quiz = generator.generate(&digest.groups).await;
        if quiz.is_empty() {
            warn!("Quiz generation produced no questions; sending without a quiz");
        }
        summary.quiz_questions = quiz.len();
        digest = digest.with_quiz(quiz);
    }

    // ---- Render ----
    let message = DigestMessage {
        subject: subject(config.edition, digest.article_count(), &digest.generated_at),
        html: html::render(&digest, config.edition),
        text: html::render_plain(&digest, config.edition),
    };

    if let Some(dir) = &options.html_output {
        match archive::write_digest(dir, &digest, &message.html).await {
            Ok(path) => summary.archived = Some(path),
            Err(e) => error!(error = %e, "Failed to archive digest HTML"),
        }
    }

    // ---- Deliver ----
    if let Some(mailer) = collaborators.mailer {
        let report = dispatch(
            mailer,
            &config.mail.recipients,
            &message,
            config.mail.send_delay(),
        )
        .await;
        summary.delivery = Some(report);
    } else {
        info!("Delivery disabled; digest not sent");
    }

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        collected = summary.collected,
        summarized = summary.summarized,
        quiz_questions = summary.quiz_questions,
        "Run complete"
    );
    Ok(summary)
}
