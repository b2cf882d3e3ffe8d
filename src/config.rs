use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the database, the model bundle and the vector index
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// The only origin allowed to call the API with credentials
    pub frontend_origin: String,
    /// SQLite file name, relative to `data_dir`
    pub db_file: String,
    /// Admission model bundle file name, relative to `data_dir`
    pub model_file: String,
    /// Vector index directory name, relative to `data_dir`
    pub index_dir: String,
    /// Collection holding the course description embeddings
    pub collection: String,
    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,
    /// Synthetic training run configuration
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// "fastembed", "hash", "ollama" or "openai"
    pub provider: String,
    /// Base URL for remote providers
    pub base_url: String,
    /// Model name for fastembed or the remote providers
    pub model: String,
    /// API key (only needed for cloud providers)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub dim: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of synthetic applicants to generate
    pub samples: usize,
    /// Seed for data generation and the train/test split
    pub seed: u64,
    /// Fraction of samples held out for the accuracy check
    pub test_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:8000".to_string(),
            frontend_origin: "http://localhost:3000".to_string(),
            db_file: "universities.db".to_string(),
            model_file: "admission_model.json".to_string(),
            index_dir: "vector_index".to_string(),
            collection: "course_recommender".to_string(),
            embedding: EmbeddingConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

/// Local sentence embeddings when compiled in, the offline hash embedder
/// otherwise.
pub const DEFAULT_EMBEDDING_PROVIDER: &str = if cfg!(feature = "fastembed-engine") {
    "fastembed"
} else {
    "hash"
};

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_EMBEDDING_PROVIDER.to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            api_key: None,
            dim: 384,
        }
    }
}

impl EmbeddingConfig {
    /// The hash embedder at the default dimension: no download, no network.
    pub fn offline() -> Self {
        Self {
            provider: "hash".to_string(),
            ..Self::default()
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: 2000,
            seed: 42,
            test_ratio: 0.2,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("UNI_NAV_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("UNI_NAV_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(origin) = std::env::var("UNI_NAV_FRONTEND_ORIGIN") {
            config.frontend_origin = origin;
        }
        if let Ok(file) = std::env::var("UNI_NAV_DB_FILE") {
            config.db_file = file;
        }
        if let Ok(file) = std::env::var("UNI_NAV_MODEL_FILE") {
            config.model_file = file;
        }
        if let Ok(dir) = std::env::var("UNI_NAV_INDEX_DIR") {
            config.index_dir = dir;
        }
        if let Ok(name) = std::env::var("UNI_NAV_COLLECTION") {
            config.collection = name;
        }

        // Embedding provider
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(url) = std::env::var("EMBEDDING_BASE_URL") {
            config.embedding.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(key) = std::env::var("EMBEDDING_API_KEY") {
            config.embedding.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.embedding.dim = d;
            }
        }

        // Training run
        if let Ok(val) = std::env::var("UNI_NAV_TRAIN_SAMPLES") {
            if let Ok(v) = val.parse() {
                config.training.samples = v;
            }
        }
        if let Ok(val) = std::env::var("UNI_NAV_TRAIN_SEED") {
            if let Ok(v) = val.parse() {
                config.training.seed = v;
            }
        }
        if let Ok(val) = std::env::var("UNI_NAV_TEST_RATIO") {
            if let Ok(v) = val.parse::<f64>() {
                if v > 0.0 && v < 1.0 {
                    config.training.test_ratio = v;
                }
            }
        }

        config
    }

    /// Config rooted at `data_dir` using the offline embedder, every other
    /// setting at its default. Used to build self-contained artifact sets.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            embedding: EmbeddingConfig::offline(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model_file)
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_dir)
    }
}
