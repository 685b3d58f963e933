//! Command-line interface definitions for the news digest.
//!
//! Flags override the YAML configuration; secrets and recipient lists are
//! normally supplied through environment variables.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::editions::Edition;

/// Collect new articles from RSS feeds, summarize them with a local model,
/// and email the digest.
///
/// # Examples
///
/// ```sh
/// # Send today's national digest
/// SMTP_PASSWORD=... news_digest --config digest.yaml
///
/// # Render the international edition without sending it
/// news_digest --edition international run --dry-run --html-output ./html
///
/// # Which feeds still work?
/// news_digest --config digest.yaml check-feeds
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Edition preset; overrides the configuration file
    #[arg(short, long, global = true, value_enum)]
    pub edition: Option<Edition>,

    /// Dedup state file
    #[arg(long, global = true, env = "NEWS_DIGEST_STATE")]
    pub state_file: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Collect, summarize and send a digest (the default)
    Run,
    /// Report which configured feeds respond with a usable RSS or Atom document
    CheckFeeds,
}

/// Options for a digest run. Accepted before or after `run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Do everything except send email
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Directory for a dated copy of the rendered HTML
    #[arg(long, global = true)]
    pub html_output: Option<PathBuf>,

    /// Recipient address; repeat for several. Replaces the configured list
    #[arg(
        long = "to",
        global = true,
        env = "DIGEST_RECIPIENTS",
        value_delimiter = ','
    )]
    pub recipients: Vec<String>,

    /// SMTP username (defaults to the sender address)
    #[arg(long, global = true, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long, global = true, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Apply command-line and environment overrides on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(edition) = self.edition {
            config.edition = edition;
        }
        if let Some(path) = &self.state_file {
            config.state_file = Some(path.clone());
        }
        let recipients: Vec<String> = self
            .run
            .recipients
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if !recipients.is_empty() {
            config.mail.recipients = recipients;
        }
        if let Some(username) = &self.run.smtp_username {
            config.mail.username = Some(username.clone());
        }
        if let Some(password) = &self.run.smtp_password {
            config.mail.password = Some(password.clone());
        }
    }
}
