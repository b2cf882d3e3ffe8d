//! In-process sentence embeddings through `fastembed` (ONNX runtime).
//!
//! The model is downloaded on first use and cached by `fastembed`; inference
//! is CPU bound, so every call runs on the blocking pool.

use anyhow::{Context, Result};
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;

/// Names accepted for all-MiniLM-L6-v2, the model course descriptions are
/// embedded with unless configured otherwise.
const MINILM_ALIASES: &[&str] = &[
    "all-minilm",
    "all-MiniLM-L6-v2",
    "sentence-transformers/all-MiniLM-L6-v2",
];

pub(crate) struct LocalModel {
    label: String,
    dim: usize,
    inner: Arc<Mutex<TextEmbedding>>,
}

fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    let name = name.trim();
    if name.is_empty() || MINILM_ALIASES.iter().any(|a| a.eq_ignore_ascii_case(name)) {
        return Ok(EmbeddingModel::AllMiniLML6V2);
    }
    EmbeddingModel::from_str(name)
        .map_err(|err| anyhow::anyhow!("Unknown fastembed model `{name}`: {err}"))
}

impl LocalModel {
    /// Load `model_name`, checking that it produces `dim`-sized vectors.
    pub(crate) fn load(model_name: &str, dim: usize) -> Result<Self> {
        let model = resolve_model(model_name)?;
        let info = TextEmbedding::get_model_info(&model)
            .map_err(|err| anyhow::anyhow!("No metadata for fastembed model `{model_name}`: {err}"))?;
        if info.dim != dim {
            anyhow::bail!(
                "fastembed model `{}` produces {} dims but {dim} are configured",
                info.model_code,
                info.dim
            );
        }
        let label = info.model_code.clone();

        tracing::info!("Loading fastembed model {label}");
        let text_embedding = TextEmbedding::try_new(TextInitOptions::new(model))
            .map_err(|err| anyhow::anyhow!("Failed to initialise fastembed model `{label}`: {err}"))?;

        Ok(Self {
            label,
            dim,
            inner: Arc::new(Mutex::new(text_embedding)),
        })
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let inner = Arc::clone(&self.inner);
        let expected = texts.len();
        let embeddings = tokio::task::spawn_blocking(move || inner.lock().embed(texts, None))
            .await
            .context("fastembed task failed")?
            .map_err(|err| anyhow::anyhow!("fastembed inference failed: {err}"))?;

        if embeddings.len() != expected {
            anyhow::bail!(
                "fastembed returned {} vectors for {expected} texts",
                embeddings.len()
            );
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dim) {
            anyhow::bail!(
                "fastembed returned {} dims, expected {}",
                bad.len(),
                self.dim
            );
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minilm_aliases_resolve() {
        for name in ["", "all-minilm", "sentence-transformers/all-MiniLM-L6-v2"] {
            assert_eq!(resolve_model(name).unwrap(), EmbeddingModel::AllMiniLML6V2);
        }
        assert!(resolve_model("no-such-model").is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected_before_download() {
        let err = LocalModel::load("all-minilm", 768).err().unwrap();
        assert!(err.to_string().contains("384"));
    }
}
