//! Novelty embed crate - embedding provider trait and backends.
//!
//! Provides the `EmbeddingService` trait, an ONNX Runtime sentence-transformer
//! backend for production, and a deterministic mock backend for tests.

pub mod embedding;

pub use embedding::{DynEmbeddingService, EmbeddingService, MockEmbedding, OnnxEmbeddingService};
