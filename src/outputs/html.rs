//! HTML and plain-text rendering of a [`Digest`].
//!
//! The HTML is a single self-contained document with inline CSS so it
//! survives mail clients. All text coming from feeds or the model is
//! escaped before it is interpolated.

use std::fmt::Write;

use crate::editions::Edition;
use crate::models::{ArticleRecord, Digest, QuizQuestion};
use crate::utils::html_escape;

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #1f2937;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f9fafb;
        }
        .header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
            border-radius: 12px;
            margin-bottom: 30px;
            text-align: center;
        }
        .header h1 { margin: 0; font-size: 32px; }
        .header p { margin: 10px 0 0 0; opacity: 0.9; font-size: 16px; }
        .region-section {
            background: white;
            border-radius: 12px;
            padding: 25px;
            margin-bottom: 25px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
        }
        .region-header {
            font-size: 24px;
            font-weight: bold;
            margin-bottom: 20px;
            padding-bottom: 10px;
            border-bottom: 3px solid;
        }
        .article { margin-bottom: 25px; padding-bottom: 25px; border-bottom: 1px solid #e5e7eb; }
        .article:last-child { border-bottom: none; margin-bottom: 0; padding-bottom: 0; }
        .article-title { font-size: 18px; font-weight: 600; margin-bottom: 8px; }
        .article-title a { color: #111827; text-decoration: none; }
        .article-source { font-size: 13px; color: #6b7280; margin-bottom: 12px; }
        .summary { background: #f9fafb; padding: 15px; border-radius: 8px; font-size: 14px; }
        .summary-line { margin: 8px 0; }
        .summary-label { font-weight: 600; color: #374151; }
        .quiz-section {
            background: white;
            border-radius: 12px;
            padding: 25px;
            margin-bottom: 25px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            border-top: 4px solid #764ba2;
        }
        .quiz-header { font-size: 24px; font-weight: bold; color: #764ba2; }
        .quiz-subtitle { color: #6b7280; margin-bottom: 20px; }
        .quiz-question { margin-bottom: 20px; padding: 15px; background: #f9fafb; border-radius: 8px; }
        .question-text { font-weight: 600; margin-bottom: 10px; }
        .option { margin: 4px 0 4px 12px; }
        .answer { margin-top: 10px; color: #059669; font-weight: 600; }
        .footer {
            text-align: center;
            color: #6b7280;
            font-size: 13px;
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid #e5e7eb;
        }
"#;

/// Render the full HTML document.
pub fn render(digest: &Digest, edition: Edition) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>{STYLE}    </style>
</head>
<body>
    <div class="header">
        <h1>{headline}</h1>
        <p>{date}</p>
    </div>
"#,
        headline = edition.headline(),
        date = digest.generated_at.format("%B %d, %Y at %I:%M %p"),
    );

    for group in digest.groups.iter().filter(|g| !g.articles.is_empty()) {
        let color = edition.category_color(&group.category);
        let _ = write!(
            html,
            r#"    <div class="region-section">
        <div class="region-header" style="border-color: {color}; color: {color};">
            {category} ({count} articles)
        </div>
"#,
            category = html_escape(&group.category),
            count = group.articles.len(),
        );
        for article in &group.articles {
            render_article(&mut html, article);
        }
        html.push_str("    </div>\n");
    }

    if !digest.quiz.is_empty() {
        render_quiz(&mut html, &digest.quiz);
    }

    let _ = write!(
        html,
        r#"    <div class="footer">
        <p>{footer}</p>
    </div>
</body>
</html>
"#,
        footer = edition.footer(),
    );
    html
}

fn render_article(html: &mut String, article: &ArticleRecord) {
    let _ = write!(
        html,
        r#"        <div class="article">
            <div class="article-title">
                <a href="{url}" target="_blank">{title}</a>
            </div>
            <div class="article-source">📌 {source}</div>
"#,
        url = html_escape(&article.url),
        title = html_escape(&article.title),
        source = html_escape(&article.source),
    );

    if let Some(summary) = &article.summary {
        html.push_str(r#"            <div class="summary">"#);
        for (label, content) in summary_lines(summary) {
            let _ = write!(
                html,
                r#"<div class="summary-line"><span class="summary-label">{}:</span> {}</div>"#,
                html_escape(label),
                html_escape(content),
            );
        }
        html.push_str("</div>\n");
    }
    html.push_str("        </div>\n");
}

fn render_quiz(html: &mut String, quiz: &[QuizQuestion]) {
    html.push_str(
        r#"    <div class="quiz-section">
        <div class="quiz-header">🎯 Test Your Knowledge!</div>
        <div class="quiz-subtitle">How well do you know what's happening around the world?</div>
"#,
    );
    for q in quiz {
        let _ = write!(
            html,
            r#"        <div class="quiz-question">
            <div class="question-text">{}</div>
"#,
            html_escape(&q.question)
        );
        for option in &q.options {
            let _ = writeln!(html, r#"            <div class="option">{}</div>"#, html_escape(option));
        }
        if !q.answer.is_empty() {
            let _ = writeln!(
                html,
                r#"            <div class="answer">✅ Correct Answer: {}</div>"#,
                html_escape(&q.answer)
            );
        }
        html.push_str("        </div>\n");
    }
    html.push_str("    </div>\n");
}

/// `LABEL: content` pairs of a summary, split on the first colon.
///
/// Lines without a colon are dropped.
pub fn summary_lines(summary: &str) -> impl Iterator<Item = (&str, &str)> {
    summary
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(label, content)| (label.trim(), content.trim()))
}

/// Plain-text alternative for mail clients without HTML.
pub fn render_plain(digest: &Digest, edition: Edition) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} - {} New Articles\n{}\n",
        edition.title(),
        digest.article_count(),
        digest.generated_at.format("%B %d, %Y at %I:%M %p"),
    );

    for group in &digest.groups {
        let _ = writeln!(text, "== {} ({} articles) ==\n", group.category, group.articles.len());
        for article in &group.articles {
            let _ = writeln!(text, "{}\n{} | {}", article.title, article.source, article.url);
            if let Some(summary) = &article.summary {
                for (label, content) in summary_lines(summary) {
                    let _ = writeln!(text, "  {label}: {content}");
                }
            }
            text.push('\n');
        }
    }

    if !digest.quiz.is_empty() {
        text.push_str("== Quiz ==\n\n");
        for q in &digest.quiz {
            let _ = writeln!(text, "{}", q.question);
            for option in &q.options {
                let _ = writeln!(text, "  {option}");
            }
            if !q.answer.is_empty() {
                let _ = writeln!(text, "  Correct Answer: {}", q.answer);
            }
            text.push('\n');
        }
    }

    text.push_str(edition.footer());
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn article(category: &str, title: &str, summary: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            category: category.to_string(),
            source: "BBC World".to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            text: "body".to_string(),
            summary: summary.map(String::from),
        }
    }

    fn digest() -> Digest {
        Digest::assemble(
            vec![
                article("World", "Summit ends", Some("WHO: Leaders\nWHAT: Talks ended: no deal\nno colon here\n")),
                article("Sports", "Cup final", None),
            ],
            Local.with_ymd_and_hms(2025, 5, 6, 9, 5, 0).unwrap(),
        )
    }

    #[test]
    fn test_summary_lines_split_on_first_colon() {
        let lines: Vec<_> = summary_lines("WHO: A\n\nWHAT: B: C\njunk\n").collect();
        assert_eq!(lines, vec![("WHO", "A"), ("WHAT", "B: C")]);
    }

    #[test]
    fn test_render_sections_and_summaries() {
        let html = render(&digest(), Edition::National);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("📰 Your News Digest"));
        assert!(html.contains("May 06, 2025 at 09:05 AM"));
        assert!(html.contains("World (1 articles)"));
        assert!(html.contains("border-color: #059669"));
        assert!(html.contains("Sports (1 articles)"));
        assert!(html.contains("border-color: #6b7280"));
        assert!(html.contains(r#"<a href="https://example.com/Summit-ends" target="_blank">Summit ends</a>"#));
        assert!(html.contains(r#"<span class="summary-label">WHAT:</span> Talks ended: no deal"#));
        assert!(!html.contains("no colon here"));
        assert!(!html.contains(r#"class="quiz-section""#));
    }

    #[test]
    fn test_render_international_headline_and_palette() {
        let digest = Digest::assemble(
            vec![
                article("World News", "Summit ends", None),
                article("Latin America", "Election held", None),
            ],
            Local.with_ymd_and_hms(2025, 5, 6, 9, 5, 0).unwrap(),
        );
        let html = render(&digest, Edition::International);

        assert!(html.contains("<h1>🌍 International News Digest</h1>"));
        assert!(!html.contains("Your International"));
        assert!(html.contains("border-color: #2563eb; color: #2563eb;\">\n            World News"));
        assert!(html.contains("border-color: #059669; color: #059669;\">\n            Latin America"));
    }

    #[test]
    fn test_render_escapes_untrusted_text() {
        let digest = Digest::assemble(
            vec![article("World", "<script>alert(1)</script>", Some("WHO: <b>x</b>\nWHAT: y"))],
            Local::now(),
        );
        let html = render(&digest, Edition::International);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn test_render_quiz_hides_empty_answer() {
        let quiz = vec![
            QuizQuestion {
                question: "Q1. Who?".to_string(),
                options: vec!["A. a".into(), "B. b".into(), "C. c".into(), "D. d".into()],
                answer: "B".to_string(),
            },
            QuizQuestion::new("Q2. Broken?"),
        ];
        let html = render(&digest().with_quiz(quiz), Edition::International);

        assert!(html.contains(r#"class="quiz-section""#));
        assert!(html.contains(r#"<div class="option">C. c</div>"#));
        assert_eq!(html.matches("Correct Answer:").count(), 1);
        assert!(html.contains("Q2. Broken?"));
    }

    #[test]
    fn test_render_plain() {
        let text = render_plain(&digest(), Edition::International);
        assert!(text.starts_with("International News Digest - 2 New Articles\n"));
        assert!(text.contains("== World (1 articles) ==\n"));
        assert!(text.contains("Summit ends\nBBC World | https://example.com/Summit-ends\n  WHO: Leaders\n"));
        assert!(text.ends_with("Powered by AI\n"));
    }
}
