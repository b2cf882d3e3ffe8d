use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::estimator::AdmissionModel;
use crate::search::vector::VectorIndex;
use crate::store;

/// Read-only context shared by every request handler.
///
/// Built once before the server accepts connections; every artifact is
/// required, so construction fails if any of them is missing or corrupt.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_path: PathBuf,
    pub estimator: Arc<AdmissionModel>,
    pub index: Arc<VectorIndex>,
    pub embedder: Arc<Embedder>,
}

impl AppState {
    pub fn load(config: Config) -> Result<Self> {
        let db_path = config.db_path();
        store::verify(&db_path).context("Relational store unavailable; run `uni-navigator seed`")?;
        tracing::info!("Using database {}", db_path.display());

        let estimator = AdmissionModel::load(&config.model_path())
            .context("Admission model unavailable; run `uni-navigator train`")?;
        tracing::info!(
            "Loaded admission model. Features: {:?}",
            estimator.features().names()
        );

        let embedder = Embedder::new(&config.embedding)?;
        let index = VectorIndex::open(&config.index_path(), &config.collection)
            .context("Vector index unavailable; run `uni-navigator build-index`")?;
        if index.count() == 0 {
            anyhow::bail!(
                "collection `{}` is empty; run `uni-navigator build-index --rebuild`",
                index.name()
            );
        }
        if index.embedder() != &embedder.spec() {
            anyhow::bail!(
                "collection `{}` was built with {} but the service is configured for {}; rebuild the index",
                index.name(),
                index.embedder(),
                embedder.spec()
            );
        }
        tracing::info!(
            "Connected to vector index. Found {} courses in `{}`",
            index.count(),
            index.name()
        );

        Ok(Self {
            config: Arc::new(config),
            db_path,
            estimator: Arc::new(estimator),
            index: Arc::new(index),
            embedder: Arc::new(embedder),
        })
    }
}
