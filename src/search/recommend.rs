use anyhow::{Context, Result};

use crate::embedding::Embedder;
use crate::models::CourseMetadata;
use crate::search::vector::VectorIndex;

/// Number of courses returned per recommendation request.
pub const RECOMMENDATION_COUNT: usize = 3;

/// Encode `query` and return the metadata of the `k` closest courses, most
/// similar first. No relevance threshold and no deduplication.
pub async fn recommend(
    embedder: &Embedder,
    index: &VectorIndex,
    query: &str,
    k: usize,
) -> Result<Vec<CourseMetadata>> {
    let query_embedding = embedder
        .embed_one(query)
        .await
        .context("Failed to embed query")?;

    // A query without any indexable token embeds to the zero vector, which has
    // no direction to rank by; fall back to index order.
    let hits = if query_embedding.iter().all(|v| *v == 0.0) {
        tracing::debug!("Query {query:?} has no indexable tokens; returning index order");
        index.head(&query_embedding, k)
    } else {
        index.query(&query_embedding, k)?
    };
    tracing::debug!(
        "Top matches for {query:?}: {:?}",
        hits.iter()
            .map(|h| (h.id.as_str(), h.distance))
            .collect::<Vec<_>>()
    );

    Ok(hits.into_iter().map(|h| h.metadata).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use crate::search::vector::{DistanceMetric, IndexRecord};

    async fn index_of(embedder: &Embedder, dir: &std::path::Path, docs: &[(&str, &str)]) -> VectorIndex {
        let index =
            VectorIndex::create(dir, "t", embedder.spec(), DistanceMetric::L2).unwrap();
        let texts: Vec<String> = docs.iter().map(|(_, d)| d.to_string()).collect();
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        let records = docs
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, ((name, doc), embedding))| IndexRecord {
                id: (i + 1).to_string(),
                embedding,
                document: doc.to_string(),
                metadata: CourseMetadata {
                    course_name: name.to_string(),
                },
            })
            .collect();
        index.add(records).unwrap();
        index
    }

    #[tokio::test]
    async fn test_own_description_ranks_first() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Embedder::new(&EmbeddingConfig::offline()).unwrap();
        let docs = [
            ("Physics", "theoretical and experimental physics, astrophysics"),
            ("Data Science", "machine learning, big data, and statistical analysis"),
            ("Politics", "political systems and international relations"),
            ("Biology", "molecular biology, ecology and genetics"),
        ];
        let index = index_of(&embedder, dir.path(), &docs).await;

        for (name, doc) in docs {
            let out = recommend(&embedder, &index, doc, RECOMMENDATION_COUNT)
                .await
                .unwrap();
            assert_eq!(out.len(), 3);
            assert_eq!(out[0].course_name, name);
        }
    }

    #[tokio::test]
    async fn test_query_without_tokens_returns_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Embedder::new(&EmbeddingConfig::offline()).unwrap();
        let docs = [
            ("First", "alpha beta"),
            ("Second", "gamma delta"),
            ("Third", "epsilon zeta"),
            ("Fourth", "eta theta"),
        ];
        let index = index_of(&embedder, dir.path(), &docs).await;

        for query in ["", "   ", "?!", "a b c"] {
            let out = recommend(&embedder, &index, query, RECOMMENDATION_COUNT)
                .await
                .unwrap();
            let names: Vec<&str> = out.iter().map(|m| m.course_name.as_str()).collect();
            assert_eq!(names, vec!["First", "Second", "Third"]);
        }
    }

    #[tokio::test]
    async fn test_fewer_courses_than_k() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Embedder::new(&EmbeddingConfig::offline()).unwrap();
        let index = index_of(&embedder, dir.path(), &[("Only", "the only course")]).await;

        let out = recommend(&embedder, &index, "anything at all", RECOMMENDATION_COUNT)
            .await
            .unwrap();
        assert_eq!(
            out,
            vec![CourseMetadata {
                course_name: "Only".into()
            }]
        );
    }
}
