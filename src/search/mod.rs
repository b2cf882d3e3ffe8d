//! Semantic course search: the persisted vector index, its offline build and
//! the query path used by recommendations.

pub mod builder;
pub mod recommend;
pub mod vector;
