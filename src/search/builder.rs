use anyhow::{Context, Result};

use crate::config::Config;
use crate::embedding::{Embedder, EmbedderSpec};
use crate::models::CourseMetadata;
use crate::search::vector::{DistanceMetric, IndexRecord, VectorIndex};
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub collection: String,
    pub count: usize,
    pub embedder: EmbedderSpec,
}

/// Embed every course description from the database into a new collection.
///
/// Records are keyed by the stringified course id, carry the description as
/// their document and `{course_name}` as metadata. An existing collection is
/// an error unless `rebuild` is set, in which case it is replaced. Nothing is
/// written until every description has been embedded, and a failed write
/// removes the partial collection.
pub async fn build_course_index(
    config: &Config,
    embedder: &Embedder,
    rebuild: bool,
) -> Result<BuildSummary> {
    let db_path = config.db_path();
    let courses = tokio::task::spawn_blocking(move || {
        store::verify(&db_path)?;
        store::catalog::list_course_documents(&db_path)
    })
    .await
    .context("Course loader task failed")??;
    if courses.is_empty() {
        anyhow::bail!("The database has no courses to index; run `uni-navigator seed`");
    }
    tracing::info!("Loaded {} courses from the database", courses.len());

    let index_dir = config.index_path();
    if !rebuild && VectorIndex::exists(&index_dir, &config.collection) {
        anyhow::bail!(
            "collection `{}` already exists in {}; pass --rebuild to replace it",
            config.collection,
            index_dir.display()
        );
    }

    let documents: Vec<String> = courses.iter().map(|c| c.description.clone()).collect();
    let embeddings = embedder
        .embed_batch(&documents)
        .await
        .context("Failed to embed course descriptions")?;

    let records: Vec<IndexRecord> = courses
        .into_iter()
        .zip(embeddings)
        .map(|(course, embedding)| IndexRecord {
            id: course.course_id.to_string(),
            embedding,
            document: course.description,
            metadata: CourseMetadata {
                course_name: course.name,
            },
        })
        .collect();

    if rebuild && VectorIndex::delete(&index_dir, &config.collection)? {
        tracing::info!("Deleted existing collection `{}`", config.collection);
    }
    let spec = embedder.spec();
    let index = VectorIndex::create(
        &index_dir,
        &config.collection,
        spec.clone(),
        DistanceMetric::default(),
    )?;
    if let Err(err) = index.add(records) {
        VectorIndex::delete(&index_dir, &config.collection)?;
        return Err(err.context("Failed to write the course index"));
    }

    tracing::info!(
        "Vector index built: {} documents in `{}` at {} using {}",
        index.count(),
        index.name(),
        index_dir.display(),
        spec
    );

    Ok(BuildSummary {
        collection: index.name().to_string(),
        count: index.count(),
        embedder: spec,
    })
}
