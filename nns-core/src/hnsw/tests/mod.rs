//! Unit tests for the HNSW index.

mod build;
mod errors;
mod fixtures;
mod sampling;
