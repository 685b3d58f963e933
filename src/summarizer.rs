//! Structured article summaries.
//!
//! Each article body is embedded in a fixed prompt asking for labelled
//! WHO / WHAT / WHEN / WHERE / WHY lines. The reply is only kept when it
//! carries at least the `WHO:` and `WHAT:` markers; anything else, including
//! a failed model call, leaves the article without a summary.

use tracing::{debug, instrument, warn};

use crate::api::{Completion, GenerationParams};
use crate::utils::truncate_for_log;

/// Section markers a reply must contain to count as a summary.
pub const REQUIRED_MARKERS: [&str; 2] = ["WHO:", "WHAT:"];

pub const SUMMARY_STOP: [&str; 2] = ["Article:", "\n\nHere"];

#[derive(Debug)]
pub struct Summarizer<'a, C> {
    llm: &'a C,
    params: GenerationParams,
    global_impact: bool,
}

impl<'a, C: Completion> Summarizer<'a, C> {
    /// `global_impact` adds a `GLOBAL IMPACT` line to the requested format.
    pub fn new(llm: &'a C, max_tokens: u32, temperature: f32, top_p: f32, global_impact: bool) -> Self {
        Self {
            llm,
            params: GenerationParams {
                max_tokens,
                temperature,
                top_p,
                stop: SUMMARY_STOP.iter().map(|s| s.to_string()).collect(),
            },
            global_impact,
        }
    }

    pub fn prompt(&self, article: &str) -> String {
        let (kind, who, location, extra) = if self.global_impact {
            (
                "international news article",
                "Key people/organizations/countries involved",
                "Specific location/country/region",
                "GLOBAL IMPACT: [International implications or significance]\n",
            )
        } else {
            (
                "news article",
                "Key people/organizations involved",
                "Location",
                "",
            )
        };
        format!(
            "Analyze this {kind} and provide a concise summary in exactly this format:\n\
             \n\
             WHO: [{who}]\n\
             WHAT: [What happened]\n\
             WHEN: [Time/date if mentioned]\n\
             WHERE: [{location}]\n\
             WHY: [Reason/context if available]\n\
             {extra}\
             \n\
             Keep each point to 1-2 sentences maximum. Be specific and factual.\n\
             \n\
             Article: {article}\n\
             \n\
             Summary:"
        )
    }

    /// Summarize one article body, or `None` when the model gives nothing usable.
    #[instrument(level = "info", skip_all, fields(chars = article.chars().count()))]
    pub async fn summarize(&self, article: &str) -> Option<String> {
        let reply = match self.llm.complete(&self.prompt(article), &self.params).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Summary request failed");
                return None;
            }
        };

        let summary = reply.trim();
        if REQUIRED_MARKERS.iter().all(|m| summary.contains(m)) {
            debug!(bytes = summary.len(), "Summary accepted");
            Some(summary.to_string())
        } else {
            warn!(
                response_preview = %truncate_for_log(summary, 200),
                "Summary is missing required sections; dropping it"
            );
            None
        }
    }
}
