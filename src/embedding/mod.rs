//! Text embedding used both to build the course index and to encode queries.
//!
//! Build and query must use the same function, so every index records the
//! [`EmbedderSpec`] it was built with and refuses to load under another one.

pub mod hash;
#[cfg(feature = "fastembed-engine")]
mod local;
mod remote;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use hash::HashEmbedder;
use remote::{Provider, RemoteEmbedder};

/// Identity of an embedding function: vectors from two different specs are
/// not comparable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderSpec {
    pub provider: String,
    pub model: String,
    pub dim: usize,
}

impl std::fmt::Display for EmbedderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({} dims)", self.provider, self.model, self.dim)
    }
}

enum Backend {
    /// all-MiniLM-L6-v2 (or another fastembed model) run in-process
    #[cfg(feature = "fastembed-engine")]
    FastEmbed(local::LocalModel),
    /// Offline fallback
    Hash(HashEmbedder),
    Remote(RemoteEmbedder),
}

/// The embedding function shared by the index build and query encoding.
pub struct Embedder {
    backend: Backend,
    dim: usize,
}

impl Embedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if config.dim == 0 {
            anyhow::bail!("embedding dimension must be greater than zero");
        }
        let backend = match config.provider.trim().to_lowercase().as_str() {
            "fastembed" => fastembed_backend(config)?,
            "" | "hash" => Backend::Hash(HashEmbedder::new(config.dim)),
            "ollama" => Backend::Remote(RemoteEmbedder::new(Provider::Ollama, config)?),
            "openai" => Backend::Remote(RemoteEmbedder::new(Provider::OpenAi, config)?),
            other => anyhow::bail!("Unknown embedding provider: {other}"),
        };

        Ok(Self {
            backend,
            dim: config.dim,
        })
    }

    pub fn spec(&self) -> EmbedderSpec {
        let (provider, model) = match &self.backend {
            #[cfg(feature = "fastembed-engine")]
            Backend::FastEmbed(local) => ("fastembed", local.label()),
            Backend::Hash(_) => ("hash", "fnv1a-bigram"),
            Backend::Remote(remote) => (remote.provider().name(), remote.model()),
        };
        EmbedderSpec {
            provider: provider.to_string(),
            model: model.to_string(),
            dim: self.dim,
        }
    }

    /// Embed a batch of texts; the result is parallel with `texts` and every
    /// vector has the configured dimension.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            #[cfg(feature = "fastembed-engine")]
            Backend::FastEmbed(local) => local.embed(texts.to_vec()).await,
            Backend::Hash(embedder) => Ok(texts.iter().map(|t| embedder.embed(t)).collect()),
            Backend::Remote(remote) => remote.embed(texts).await,
        }
    }

    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .context("No embedding returned")
    }
}

#[cfg(feature = "fastembed-engine")]
fn fastembed_backend(config: &EmbeddingConfig) -> Result<Backend> {
    Ok(Backend::FastEmbed(local::LocalModel::load(
        &config.model,
        config.dim,
    )?))
}

#[cfg(not(feature = "fastembed-engine"))]
fn fastembed_backend(_config: &EmbeddingConfig) -> Result<Backend> {
    anyhow::bail!(
        "embedding provider `fastembed` needs a build with the `fastembed-engine` feature; \
         set EMBEDDING_PROVIDER=hash for the offline embedder"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_backend_batch_is_parallel_with_input() {
        let embedder = Embedder::new(&EmbeddingConfig::offline()).unwrap();
        let texts = vec!["physics".to_string(), "biology".to_string()];
        let out = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 384);
        assert_ne!(out[0], out[1]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let embedder = Embedder::new(&EmbeddingConfig::offline()).unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = EmbeddingConfig {
            provider: "word2vec".into(),
            ..EmbeddingConfig::offline()
        };
        assert!(Embedder::new(&config).is_err());
    }

    #[cfg(not(feature = "fastembed-engine"))]
    #[test]
    fn test_fastembed_needs_feature() {
        let config = EmbeddingConfig {
            provider: "fastembed".into(),
            ..EmbeddingConfig::offline()
        };
        let err = Embedder::new(&config).err().unwrap();
        assert!(err.to_string().contains("fastembed-engine"));
    }

    #[test]
    fn test_zero_dim_rejected() {
        let config = EmbeddingConfig {
            dim: 0,
            ..EmbeddingConfig::offline()
        };
        assert!(Embedder::new(&config).is_err());
    }

    #[test]
    fn test_spec_identifies_provider_and_dim() {
        let embedder = Embedder::new(&EmbeddingConfig {
            dim: 64,
            ..EmbeddingConfig::offline()
        })
        .unwrap();
        let spec = embedder.spec();
        assert_eq!(spec.provider, "hash");
        assert_eq!(spec.dim, 64);

        let ollama = Embedder::new(&EmbeddingConfig {
            provider: "ollama".into(),
            ..EmbeddingConfig::offline()
        })
        .unwrap();
        assert_ne!(ollama.spec(), embedder.spec());
    }
}
