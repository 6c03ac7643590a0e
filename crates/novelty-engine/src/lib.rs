//! Novelty engine crate - scoring math, extraction seam, request pipeline.
//!
//! Provides the novelty score and its categorical interpretation, the text
//! extraction trait for document uploads, and the orchestrating pipeline
//! that ties validation, embedding, persistence, and scoring together.

pub mod extract;
pub mod pipeline;
pub mod scoring;

pub use extract::{DocumentFormat, PlainTextExtractor, TextExtractor};
pub use pipeline::{NoveltyPipeline, NoveltyReport};
pub use scoring::{novelty_score, Interpretation};
