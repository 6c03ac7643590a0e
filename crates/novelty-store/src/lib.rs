//! Novelty store crate - SQLite persistence and similarity search.
//!
//! Provides a WAL-mode SQLite database with migrations, the proposal
//! repository (upsert/append writes, exact cosine nearest-neighbor scan,
//! counts), and the f32 BLOB vector codec.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod vector;

pub use db::Database;
pub use repository::ProposalRepository;
pub use vector::{cosine_similarity, decode_embedding, encode_embedding};
