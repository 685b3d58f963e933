//! # News Digest
//!
//! Collects new articles from categorized RSS/Atom feeds, summarizes each
//! one with a local llama.cpp-compatible model, optionally writes a quiz
//! over the day's summaries, and emails the result as an HTML digest.
//!
//! ## Usage
//!
//! ```sh
//! news_digest --config digest.yaml
//! news_digest --edition international run --dry-run --html-output ./html
//! news_digest check-feeds
//! ```
//!
//! ## Architecture
//!
//! 1. **Collection**: read feeds, skip links already seen, fetch and filter article text
//! 2. **Summaries**: one WHO/WHAT/WHEN/WHERE/WHY summary per article, in order
//! 3. **Quiz**: multiple-choice questions over all summaries (international edition)
//! 4. **Output**: HTML + plain-text email to each recipient, optional HTML archive
//!
//! Links are recorded in a JSON dedup file right after collection, so an
//! article is offered at most once even if a later stage fails.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod check;
mod cli;
mod collector;
mod config;
mod dedup;
mod editions;
mod error;
mod extract;
mod feeds;
mod mailer;
mod models;
mod outputs;
mod pipeline;
mod quiz;
mod summarizer;
mod utils;

use api::LlamaServer;
use cli::{Cli, Command, RunArgs};
use config::Config;
use extract::HtmlExtractor;
use feeds::HttpFeedReader;
use mailer::{SmtpMailer, SmtpSettings};
use pipeline::{Collaborators, RunOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("news_digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(config = ?args.config, edition = ?args.edition, command = ?args.command(), "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            info!("No config file given; using built-in defaults");
            Config::default()
        }
    };
    args.apply(&mut config);
    config.mail.recipients = config.mail.recipients.into_iter().unique().collect();

    match args.command() {
        Command::CheckFeeds => check_feeds(&config).await?,
        Command::Run => run_digest(&config, &args.run).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn check_feeds(config: &Config) -> Result<(), Box<dyn Error>> {
    config.validate(false)?;
    let reader = HttpFeedReader::new(&config.http)?;
    let checks = check::check_feeds(&reader, &config.sources()).await;
    println!("{}", check::render_report(&checks));
    Ok(())
}

async fn run_digest(config: &Config, args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let deliver = !args.dry_run;
    if let Err(e) = config.validate(deliver) {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }
    info!(
        edition = ?config.edition,
        sources = config.sources().len(),
        state_file = %config.state_file().display(),
        dry_run = args.dry_run,
        "Configuration ready"
    );

    let feeds = HttpFeedReader::new(&config.http)?;
    let extractor = HtmlExtractor::new(&config.http)?;
    let llm = LlamaServer::new(
        &config.model.base_url,
        Duration::from_secs(config.model.timeout_secs),
    )?;
    let mailer = if deliver {
        Some(SmtpMailer::new(&smtp_settings(config)?)?)
    } else {
        None
    };

    let options = RunOptions {
        html_output: args.html_output.clone(),
    };
    let summary = pipeline::run(
        config,
        Collaborators {
            feeds: &feeds,
            extractor: &extractor,
            llm: &llm,
            mailer: mailer.as_ref(),
        },
        &options,
    )
    .await?;

    match &summary.delivery {
        Some(report) if !report.delivered() => {
            error!(failed = ?report.failed, "Digest could not be delivered to any recipient");
            Err(error::Error::Delivery("all recipients failed".to_string()).into())
        }
        Some(report) if !report.failed.is_empty() => {
            warn!(sent = report.sent, failed = ?report.failed, "Digest partially delivered");
            Ok(())
        }
        _ => Ok(()),
    }
}

fn smtp_settings(config: &Config) -> Result<SmtpSettings, error::Error> {
    let from = config
        .mail
        .from
        .clone()
        .ok_or_else(|| error::Error::Config("mail.from is required to send".to_string()))?;
    if config.mail.password.is_none() {
        warn!("No SMTP password set (SMTP_PASSWORD); connecting without authentication");
    }
    Ok(SmtpSettings {
        host: config.mail.smtp_host.clone(),
        port: config.smtp_port(),
        security: config.smtp_security(),
        from,
        username: config.mail.username.clone(),
        password: config.mail.password.clone(),
    })
}
