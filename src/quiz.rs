//! Multiple-choice quiz over the collected summaries.
//!
//! All summaries go into a single prompt (bounded by a character budget) and
//! the model is asked for five questions in a fixed line format. The reply
//! is parsed line by line without any structural validation: a question
//! with three options or no answer is still shown to readers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;
use tracing::{info, instrument, warn};

use crate::api::{Completion, GenerationParams};
use crate::models::{CategoryGroup, QuizQuestion};
use crate::utils::{truncate_chars, truncate_for_log};

pub const QUIZ_STOP: [&str; 2] = ["Articles Summary:", "\n\nHere"];

const OPTION_PREFIXES: [&str; 4] = ["A.", "B.", "C.", "D."];
const ANSWER_MARKER: &str = "Correct Answer:";

static QUESTION_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q\d+\.").unwrap());

const QUIZ_PROMPT_HEAD: &str = "Based on the international news articles provided, create 5 multiple choice questions to test comprehension.

STRICT REQUIREMENTS:
- Create exactly 5 questions covering different international articles
- Each question must have exactly 4 options (A, B, C, D)
- Each question must have exactly 1 correct answer
- Questions should test factual recall from the articles
- Include a mix of WHO, WHAT, WHEN, WHERE, WHY questions
- Focus on international/global content

FORMAT (follow exactly):
Q1. [Question about international article content]
A. [Option A]
B. [Option B]
C. [Option C]
D. [Option D]
Correct Answer: [Single letter: A, B, C, or D]

Q2. [Question about international article content]
A. [Option A]
B. [Option B]
C. [Option C]
D. [Option D]
Correct Answer: [Single letter: A, B, C, or D]

[Continue for Q3, Q4, Q5...]

International Articles Summary:
";

const QUIZ_PROMPT_TAIL: &str = "\n\nGenerate exactly 5 questions now:";

#[derive(Debug)]
pub struct QuizGenerator<'a, C> {
    llm: &'a C,
    params: GenerationParams,
    prompt_budget: usize,
}

impl<'a, C: Completion> QuizGenerator<'a, C> {
    pub fn new(llm: &'a C, max_tokens: u32, temperature: f32, top_p: f32, prompt_budget: usize) -> Self {
        Self {
            llm,
            params: GenerationParams {
                max_tokens,
                temperature,
                top_p,
                stop: QUIZ_STOP.iter().map(|s| s.to_string()).collect(),
            },
            prompt_budget,
        }
    }

    /// Titles and summaries of every summarized article, cut to the budget.
    pub fn articles_summary(&self, groups: &[CategoryGroup]) -> String {
        let mut summary = String::new();
        for article in groups.iter().flat_map(|g| g.articles.iter()) {
            if let Some(text) = &article.summary {
                let _ = write!(summary, "\nArticle: {}\n{}\n", article.title, text);
            }
        }
        truncate_chars(&summary, self.prompt_budget).to_string()
    }

    pub fn prompt(&self, articles_summary: &str) -> String {
        format!("{QUIZ_PROMPT_HEAD}{articles_summary}{QUIZ_PROMPT_TAIL}")
    }

    /// Ask for a quiz over `groups`. Empty on failure or when nothing was summarized.
    ///
    /// With no summaries the model is not called at all, rather than being
    /// prompted with an empty summary block.
    #[instrument(level = "info", skip_all)]
    pub async fn generate(&self, groups: &[CategoryGroup]) -> Vec<QuizQuestion> {
        let articles_summary = self.articles_summary(groups);
        if articles_summary.is_empty() {
            info!("No summaries to build a quiz from");
            return Vec::new();
        }

        match self.llm.complete(&self.prompt(&articles_summary), &self.params).await {
            Ok(reply) => {
                let questions = parse_quiz(reply.trim());
                if questions.is_empty() {
                    warn!(
                        response_preview = %truncate_for_log(&reply, 300),
                        "Quiz reply contained no questions"
                    );
                }
                let malformed = questions.iter().filter(|q| !q.is_well_formed()).count();
                info!(count = questions.len(), malformed, "Parsed quiz questions");
                questions
            }
            Err(e) => {
                warn!(error = %e, "Quiz generation failed");
                Vec::new()
            }
        }
    }
}

/// Parse the model's quiz reply.
///
/// - `Q<digits>.` opens a question, closing any open one
/// - `A.` to `D.` lines are appended verbatim as options of the open question
/// - `Correct Answer:` sets the answer to the trimmed text after the colon
///
/// Blank and unrecognized lines are skipped, as are option and answer lines
/// seen before the first question.
pub fn parse_quiz(text: &str) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    let mut current: Option<QuizQuestion> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if QUESTION_START.is_match(line) {
            questions.extend(current.replace(QuizQuestion::new(line)));
        } else if OPTION_PREFIXES.iter().any(|p| line.starts_with(p)) {
            if let Some(q) = current.as_mut() {
                q.options.push(line.to_string());
            }
        } else if line.starts_with(ANSWER_MARKER) {
            if let Some(q) = current.as_mut() {
                q.answer = line
                    .split_once(':')
                    .map(|(_, rest)| rest.trim().to_string())
                    .unwrap_or_default();
            }
        }
    }
    questions.extend(current);
    questions
}
