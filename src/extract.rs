//! Article body extraction.
//!
//! [`HtmlExtractor`] downloads an article page and keeps the text of its
//! paragraphs, looking inside `<article>` first, then `<main>`, then the
//! whole page. Paywalls and index pages usually come back with no usable
//! paragraphs and surface as an extraction error.

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::config::HttpSettings;
use crate::error::{Error, Result};

/// Fetches the plain body text of an article.
pub trait ContentExtractor {
    async fn extract(&self, url: &str) -> Result<String>;
}

static PARAGRAPH_SCOPES: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article p", "main p", "p"]
        .into_iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    client: Client,
}

impl HtmlExtractor {
    pub fn new(http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(http.timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl ContentExtractor for HtmlExtractor {
    #[instrument(level = "debug", skip(self))]
    async fn extract(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Extraction {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        let body = response.text().await?;
        let text = extract_text(&body);
        if text.is_empty() {
            return Err(Error::Extraction {
                url: url.to_string(),
                reason: "no article paragraphs found".to_string(),
            });
        }
        debug!(bytes = text.len(), "Extracted article text");
        Ok(text)
    }
}

/// Paragraph text of an HTML document, one paragraph per block.
///
/// The first selector scope that yields any non-empty paragraph wins.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    for selector in PARAGRAPH_SCOPES.iter() {
        let paragraphs: Vec<String> = document
            .select(selector)
            .map(|p| {
                // Join text nodes first so inline markup inside a word stays glued.
                let raw: String = p.text().collect();
                raw.split_whitespace().collect::<Vec<_>>().join(" ")
            })
            .filter(|p| !p.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            return paragraphs.join("\n\n");
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>t</title></head><body>
        <nav><p>Subscribe now</p></nav>
        <article>
          <h1>Headline</h1>
          <p>First   paragraph with <a href="/x">a link</a>.</p>
          <p>   </p>
          <p>Second paragraph.</p>
        </article>
        <footer><p>Copyright</p></footer>
    </body></html>"#;

    #[test]
    fn test_extract_prefers_article_paragraphs() {
        assert_eq!(
            extract_text(PAGE),
            "First paragraph with a link.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_extract_keeps_inline_markup_inside_words() {
        let html = "<article><p>A pre<b>fix</b> and <i>it</i>alic, <a href=\"/y\">linked</a>.</p></article>";
        let text = extract_text(html);
        assert_eq!(text, "A prefix and italic, linked.");
        assert_eq!(crate::utils::word_count(&text), 5);
    }

    #[test]
    fn test_extract_falls_back_to_main_then_page() {
        let main = "<body><p>outside</p><main><p>inside main</p></main></body>";
        assert_eq!(extract_text(main), "inside main");

        let bare = "<body><div><p>one</p></div><p>two</p></body>";
        assert_eq!(extract_text(bare), "one\n\ntwo");
    }

    #[test]
    fn test_extract_without_paragraphs_is_empty() {
        assert_eq!(extract_text("<body><div>no paragraphs</div></body>"), "");
    }

    #[tokio::test]
    async fn test_extract_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let extractor = HtmlExtractor::new(&HttpSettings::default()).unwrap();
        let text = extractor
            .extract(&format!("{}/story", server.uri()))
            .await
            .unwrap();
        assert!(text.starts_with("First paragraph"));
    }

    #[tokio::test]
    async fn test_extract_paywall_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paywalled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<div>Log in</div>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let extractor = HtmlExtractor::new(&HttpSettings::default()).unwrap();
        for route in ["/paywalled", "/gone"] {
            let result = extractor.extract(&format!("{}{route}", server.uri())).await;
            assert!(matches!(result, Err(Error::Extraction { .. })), "{route}");
        }
    }
}
