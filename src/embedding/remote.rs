//! HTTP embedding providers: an Ollama server or any OpenAI-compatible
//! `/v1/embeddings` endpoint.
//!
//! Texts are sent in provider-sized batches and every batch is checked for
//! vector count and dimension before it is accepted, so a misconfigured
//! model fails the build instead of producing a mixed index.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

/// Characters kept per text. Course descriptions are far shorter; free-text
/// queries are not bounded by the API.
const MAX_EMBED_CHARS: usize = 3_000;

/// Cut `text` to at most `MAX_EMBED_CHARS` bytes on a UTF-8 char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Provider {
    Ollama,
    OpenAi,
}

impl Provider {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::Ollama => "/api/embed",
            Self::OpenAi => "/v1/embeddings",
        }
    }

    fn batch_size(self) -> usize {
        match self {
            Self::Ollama => 32,
            Self::OpenAi => 64,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

pub(crate) struct RemoteEmbedder {
    provider: Provider,
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
}

impl RemoteEmbedder {
    pub(crate) fn new(provider: Provider, config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            provider,
            client,
            url: format!("{}{}", config.base_url.trim_end_matches('/'), provider.path()),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            dim: config.dim,
        })
    }

    pub(crate) fn provider(&self) -> Provider {
        self.provider
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    /// Embed `texts` batch by batch; the result is parallel with the input.
    pub(crate) async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.provider.batch_size()) {
            let input: Vec<&str> = chunk.iter().map(|t| truncate_for_embedding(t)).collect();
            let vectors = match self.provider {
                Provider::Ollama => self.call_ollama(input).await?,
                Provider::OpenAi => self.call_openai(input).await?,
            };
            self.check_batch(chunk.len(), &vectors)?;
            all.extend(vectors);
        }
        Ok(all)
    }

    fn check_batch(&self, sent: usize, vectors: &[Vec<f32>]) -> Result<()> {
        if vectors.len() != sent {
            anyhow::bail!(
                "{} returned {} vectors for {sent} texts",
                self.provider.name(),
                vectors.len()
            );
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            anyhow::bail!(
                "{} model `{}` returned {} dims, expected {}",
                self.provider.name(),
                self.model,
                bad.len(),
                self.dim
            );
        }
        Ok(())
    }

    async fn send<T: Serialize>(&self, body: &T) -> Result<reqwest::Response> {
        let mut req = self.client.post(&self.url).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to reach {} at {}", self.provider.name(), self.url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} embed API returned {status}: {body}", self.provider.name());
        }
        Ok(resp)
    }

    async fn call_ollama(&self, input: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let request = OllamaRequest {
            model: &self.model,
            input,
            truncate: true,
        };
        let body: OllamaResponse = self
            .send(&request)
            .await?
            .json()
            .await
            .context("Failed to parse Ollama embed response")?;
        Ok(body.embeddings)
    }

    async fn call_openai(&self, input: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let request = OpenAiRequest {
            model: &self.model,
            input,
        };
        let mut body: OpenAiResponse = self
            .send(&request)
            .await?
            .json()
            .await
            .context("Failed to parse OpenAI embed response")?;
        // Entries carry their input position; do not trust response order.
        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}
