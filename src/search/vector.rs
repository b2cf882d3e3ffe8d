use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::embedding::EmbedderSpec;
use crate::models::CourseMetadata;

/// Distance used to rank neighbours; smaller is closer for every metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    L2,
    /// 1 - cosine similarity
    Cosine,
    /// 1 - dot product
    InnerProduct,
}

impl DistanceMetric {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Self::Cosine => 1.0 - cosine_similarity(a, b),
            Self::InnerProduct => 1.0 - a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>(),
        }
    }
}

/// One document to store in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: CourseMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    pub document: String,
    pub metadata: CourseMetadata,
    pub distance: f32,
}

#[derive(Serialize, Deserialize)]
struct CollectionFile {
    name: String,
    metric: DistanceMetric,
    embedder: EmbedderSpec,
    built_at: DateTime<Utc>,
    records: Vec<IndexRecord>,
}

/// A named collection of embedded documents, persisted as one JSON file and
/// searched exhaustively.
///
/// Writes only happen while building. Ids are unique: adding a batch that
/// repeats an existing id (or repeats an id within itself) is rejected
/// as a whole.
pub struct VectorIndex {
    name: String,
    metric: DistanceMetric,
    embedder: EmbedderSpec,
    built_at: DateTime<Utc>,
    records: RwLock<Vec<IndexRecord>>,
    persist_path: PathBuf,
}

impl VectorIndex {
    pub fn collection_path(index_dir: &Path, name: &str) -> PathBuf {
        index_dir.join(format!("{name}.json"))
    }

    /// Create an empty collection on disk. Fails if it already exists.
    pub fn create(
        index_dir: &Path,
        name: &str,
        embedder: EmbedderSpec,
        metric: DistanceMetric,
    ) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;
        let persist_path = Self::collection_path(index_dir, name);
        if persist_path.exists() {
            anyhow::bail!(
                "collection `{name}` already exists at {}",
                persist_path.display()
            );
        }

        let index = Self {
            name: name.to_string(),
            metric,
            embedder,
            built_at: Utc::now(),
            records: RwLock::new(Vec::new()),
            persist_path,
        };
        index.persist(&index.records.read())?;
        Ok(index)
    }

    /// Open an existing collection. A missing or unreadable file is an error.
    pub fn open(index_dir: &Path, name: &str) -> Result<Self> {
        let persist_path = Self::collection_path(index_dir, name);
        let data = std::fs::read_to_string(&persist_path).with_context(|| {
            format!(
                "Failed to read collection `{name}` at {}",
                persist_path.display()
            )
        })?;
        let file: CollectionFile = serde_json::from_str(&data)
            .with_context(|| format!("Collection `{name}` is corrupt"))?;

        if let Some(bad) = file
            .records
            .iter()
            .find(|r| r.embedding.len() != file.embedder.dim)
        {
            anyhow::bail!(
                "collection `{name}` record {} has {} dims, expected {}",
                bad.id,
                bad.embedding.len(),
                file.embedder.dim
            );
        }

        Ok(Self {
            name: file.name,
            metric: file.metric,
            embedder: file.embedder,
            built_at: file.built_at,
            records: RwLock::new(file.records),
            persist_path,
        })
    }

    pub fn exists(index_dir: &Path, name: &str) -> bool {
        Self::collection_path(index_dir, name).exists()
    }

    /// Remove a collection file if present.
    pub fn delete(index_dir: &Path, name: &str) -> Result<bool> {
        let path = Self::collection_path(index_dir, name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete collection {}", path.display()))?;
        Ok(true)
    }

    /// Add a batch of records and persist the collection.
    pub fn add(&self, batch: Vec<IndexRecord>) -> Result<()> {
        let mut records = self.records.write();

        let mut seen: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        for record in &batch {
            if !seen.insert(record.id.as_str()) {
                anyhow::bail!(
                    "id `{}` already exists in collection `{}`",
                    record.id,
                    self.name
                );
            }
            if record.embedding.len() != self.embedder.dim {
                anyhow::bail!(
                    "record `{}` has {} dims, collection expects {}",
                    record.id,
                    record.embedding.len(),
                    self.embedder.dim
                );
            }
        }

        let mut updated = records.clone();
        updated.extend(batch);
        self.persist(&updated)?;
        *records = updated;
        Ok(())
    }

    /// The `k` nearest records, ascending by distance. Equal distances keep
    /// insertion order; a NaN distance counts as infinite.
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        if embedding.len() != self.embedder.dim {
            anyhow::bail!(
                "query has {} dims, collection `{}` expects {}",
                embedding.len(),
                self.name,
                self.embedder.dim
            );
        }

        let records = self.records.read();
        let mut scored: Vec<(f32, &IndexRecord)> = records
            .iter()
            .map(|r| (self.metric.distance(embedding, &r.embedding), r))
            .map(|(d, r)| (if d.is_nan() { f32::INFINITY } else { d }, r))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, r)| IndexHit {
                id: r.id.clone(),
                document: r.document.clone(),
                metadata: r.metadata.clone(),
                distance,
            })
            .collect())
    }

    /// The first `k` records in insertion order, with distances to `embedding`.
    pub fn head(&self, embedding: &[f32], k: usize) -> Vec<IndexHit> {
        self.records
            .read()
            .iter()
            .take(k)
            .map(|r| IndexHit {
                id: r.id.clone(),
                document: r.document.clone(),
                metadata: r.metadata.clone(),
                distance: self.metric.distance(embedding, &r.embedding),
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.records.read().len()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn embedder(&self) -> &EmbedderSpec {
        &self.embedder
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Atomic write via temp file + rename.
    fn persist(&self, records: &[IndexRecord]) -> Result<()> {
        let file = CollectionFile {
            name: self.name.clone(),
            metric: self.metric,
            embedder: self.embedder.clone(),
            built_at: self.built_at,
            records: records.to_vec(),
        };
        let data = serde_json::to_string(&file)?;
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.persist_path)?;
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
