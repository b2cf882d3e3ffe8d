//! # uni-navigator
//!
//! An admissions-advisory API over a small catalog of German universities.
//! It lists courses from SQLite, recommends courses for free text through an
//! embedding index, and estimates an applicant's admission chance with a
//! logistic regression.
//!
//! ## Artifacts
//!
//! ```text
//!   seed ──────────▶ universities.db ─────────┐
//!                        │                    │
//!   build-index ◀────────┘                    ▼
//!        │                             ┌─────────────┐
//!        └──▶ vector_index/ ─────────▶ │  AppState   │ ──▶ axum router
//!                                      │ (read-only) │
//!   train ─────────▶ admission_model ─▶└─────────────┘
//! ```
//!
//! The three offline jobs must run before `serve`; a missing or corrupt
//! artifact aborts startup.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for paths, CORS, embedding and training
//! - [`models`] - Catalog records and request/response types
//! - [`store`] - SQLite schema, seed catalog and read queries (connection per call)
//! - [`embedding`] - all-MiniLM-L6-v2 via fastembed (`fastembed-engine` feature),
//!   the offline hash embedder, or Ollama / OpenAI-compatible embedding APIs
//! - [`search::vector`] - Persisted exhaustive k-NN collection
//! - [`search::builder`] - Offline build of the course description index
//! - [`search::recommend`] - Query path: embed, search, return course names
//! - [`estimator`] - Feature schema, logistic regression and synthetic training
//! - [`api`] - Axum handlers and CORS
//! - [`state`] - Shared read-only application state

pub mod api;
pub mod config;
pub mod embedding;
pub mod estimator;
pub mod models;
pub mod search;
pub mod state;
pub mod store;
