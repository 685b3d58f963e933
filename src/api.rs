//! Text completion against a local language model.
//!
//! - [`Completion`]: the trait the summarizer and quiz generator depend on
//! - [`GenerationParams`]: per-call sampling settings and stop sequences
//! - [`LlamaServer`]: a client for the `/completion` endpoint of a
//!   llama.cpp-compatible server
//!
//! There is no retry here. A failed call is reported to the caller, which
//! logs it and carries on without the generated text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

/// Sampling settings for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Generation halts as soon as any of these is produced.
    pub stop: Vec<String>,
}

/// Something that turns a prompt into generated text.
pub trait Completion {
    /// Complete `prompt` and return the generated text, which may be empty.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_p: f32,
    stop: &'a [String],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

/// Client for a llama.cpp server's native completion endpoint.
pub struct LlamaServer {
    client: Client,
    endpoint: String,
}

impl LlamaServer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/completion", base_url.trim_end_matches('/')),
        })
    }
}

impl fmt::Debug for LlamaServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlamaServer")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Completion for LlamaServer {
    #[instrument(level = "info", skip_all, fields(max_tokens = params.max_tokens))]
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let t0 = Instant::now();
        let request = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop: &params.stop,
            stream: false,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis(),
                %status,
                "Completion call failed"
            );
            return Err(Error::Completion(format!("HTTP {status}: {body}")));
        }

        let parsed: CompletionResponse = response.json().await?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis(),
            bytes = parsed.content.len(),
            "Completion returned"
        );
        Ok(parsed.content)
    }
}
