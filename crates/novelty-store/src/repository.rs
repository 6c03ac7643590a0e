//! Proposal repository: SQLite-backed persistence and similarity queries.
//!
//! The nearest-neighbor query is an exact cosine scan over all rows. The
//! corpus this service targets is small enough that exact ranking is both
//! correct and fast; the `key` index covers the lookup paths.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rusqlite::OptionalExtension;
use tracing::debug;

use novelty_core::error::NoveltyError;
use novelty_core::types::{IdentityMode, NeighborMatch, Proposal};

use crate::db::Database;
use crate::vector::{cosine_similarity, decode_embedding, encode_embedding, to_similarity};

/// Repository for proposal records.
///
/// Bound to one embedding dimension at construction: a vector of any other
/// length is rejected before a row is written or a scan begins.
pub struct ProposalRepository {
    db: Arc<Database>,
    dimensions: usize,
    mode: IdentityMode,
}

impl ProposalRepository {
    pub fn new(db: Arc<Database>, dimensions: usize, mode: IdentityMode) -> Self {
        Self {
            db,
            dimensions,
            mode,
        }
    }

    /// The embedding dimension this repository accepts.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The identity mode this repository enforces.
    pub fn mode(&self) -> IdentityMode {
        self.mode
    }

    /// Store a proposal, returning its durable row id.
    ///
    /// In upsert mode an existing key has its text, embedding, and
    /// updated_at replaced in place; in append mode every call inserts a
    /// new row. The select-then-write pair runs under one connection lock,
    /// so concurrent same-key writes serialize (last writer wins).
    pub fn save(&self, key: &str, text: &str, embedding: &[f32]) -> Result<i64, NoveltyError> {
        self.check_dimensions(embedding)?;
        let blob = encode_embedding(embedding);

        self.db.with_conn(|conn| {
            if self.mode == IdentityMode::Upsert {
                let existing: Option<i64> = conn
                    .query_row(
                        "SELECT id FROM proposals WHERE key = ?1",
                        rusqlite::params![key],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| NoveltyError::Store(format!("Failed to look up key: {}", e)))?;

                if let Some(id) = existing {
                    conn.execute(
                        "UPDATE proposals
                         SET text = ?2, embedding = ?3, dimensions = ?4,
                             updated_at = strftime('%s', 'now')
                         WHERE id = ?1",
                        rusqlite::params![id, text, blob, self.dimensions as i64],
                    )
                    .map_err(|e| {
                        NoveltyError::Store(format!("Failed to update proposal: {}", e))
                    })?;
                    debug!(key, id, "Proposal updated in place");
                    return Ok(id);
                }
            }

            conn.execute(
                "INSERT INTO proposals (key, text, embedding, dimensions)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![key, text, blob, self.dimensions as i64],
            )
            .map_err(|e| NoveltyError::Store(format!("Failed to insert proposal: {}", e)))?;

            let id = conn.last_insert_rowid();
            debug!(key, id, "Proposal inserted");
            Ok(id)
        })
    }

    /// Return up to `limit` stored records ordered by descending cosine
    /// similarity to `embedding`, optionally excluding one key.
    ///
    /// Similarity is clamped to [0, 1] and rounded to 4 decimals. Ties are
    /// broken by insertion order (ascending row id).
    pub fn find_similar(
        &self,
        embedding: &[f32],
        exclude_key: Option<&str>,
        limit: usize,
    ) -> Result<Vec<NeighborMatch>, NoveltyError> {
        self.check_dimensions(embedding)?;

        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, key, embedding FROM proposals
                     WHERE (?1 IS NULL OR key != ?1)",
                )
                .map_err(|e| NoveltyError::Store(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![exclude_key], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })
                .map_err(|e| NoveltyError::Store(e.to_string()))?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(|e| NoveltyError::Store(e.to_string()))?);
            }
            Ok(out)
        })?;

        let mut hits: Vec<(i64, NeighborMatch)> = Vec::with_capacity(rows.len());
        for (id, key, blob) in rows {
            let candidate = decode_embedding(&blob, self.dimensions)?;
            let Some(cosine) = cosine_similarity(embedding, &candidate) else {
                continue;
            };
            hits.push((
                id,
                NeighborMatch {
                    key,
                    similarity: to_similarity(cosine),
                },
            ));
        }

        hits.sort_by(|a, b| {
            b.1.similarity
                .partial_cmp(&a.1.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        hits.truncate(limit);

        Ok(hits.into_iter().map(|(_, neighbor)| neighbor).collect())
    }

    /// Total number of stored records.
    pub fn count(&self) -> Result<u64, NoveltyError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM proposals", [], |row| row.get(0))
                .map_err(|e| NoveltyError::Store(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Look up the most recent record for a key.
    pub fn find_by_key(&self, key: &str) -> Result<Option<Proposal>, NoveltyError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, key, text, dimensions, created_at, updated_at
                     FROM proposals WHERE key = ?1
                     ORDER BY id DESC LIMIT 1",
                )
                .map_err(|e| NoveltyError::Store(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![key], |row| {
                    Ok(Proposal {
                        id: row.get(0)?,
                        key: row.get(1)?,
                        text: row.get(2)?,
                        dimensions: row.get::<_, i64>(3)? as usize,
                        created_at: Utc
                            .timestamp_opt(row.get::<_, i64>(4)?, 0)
                            .single()
                            .unwrap_or_default(),
                        updated_at: Utc
                            .timestamp_opt(row.get::<_, i64>(5)?, 0)
                            .single()
                            .unwrap_or_default(),
                    })
                })
                .optional()
                .map_err(|e| NoveltyError::Store(e.to_string()))?;

            Ok(result)
        })
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<(), NoveltyError> {
        if embedding.len() != self.dimensions {
            return Err(NoveltyError::Store(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: usize = 4;

    fn make_repo(mode: IdentityMode) -> ProposalRepository {
        let db = Arc::new(Database::in_memory().unwrap());
        ProposalRepository::new(db, DIMS, mode)
    }

    fn unit(x: f32, y: f32, z: f32, w: f32) -> Vec<f32> {
        let norm = (x * x + y * y + z * z + w * w).sqrt();
        vec![x / norm, y / norm, z / norm, w / norm]
    }

    #[test]
    fn test_save_returns_row_id() {
        let repo = make_repo(IdentityMode::Upsert);
        let id = repo.save("APP-001", "solar text", &unit(1.0, 0.0, 0.0, 0.0)).unwrap();
        assert!(id > 0);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let repo = make_repo(IdentityMode::Upsert);
        let first = repo.save("APP-001", "original text", &unit(1.0, 0.0, 0.0, 0.0)).unwrap();
        let second = repo.save("APP-001", "revised text", &unit(0.0, 1.0, 0.0, 0.0)).unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.count().unwrap(), 1);

        let stored = repo.find_by_key("APP-001").unwrap().unwrap();
        assert_eq!(stored.text, "revised text");

        // The embedding was replaced too: the old vector no longer matches.
        let hits = repo.find_similar(&unit(0.0, 1.0, 0.0, 0.0), None, 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_append_mode_creates_duplicate_rows() {
        let repo = make_repo(IdentityMode::Append);
        let first = repo.save("APP-001", "v1", &unit(1.0, 0.0, 0.0, 0.0)).unwrap();
        let second = repo.save("APP-001", "v2", &unit(1.0, 0.0, 0.0, 0.0)).unwrap();

        assert_ne!(first, second);
        assert_eq!(repo.count().unwrap(), 2);

        // find_by_key returns the latest revision.
        let stored = repo.find_by_key("APP-001").unwrap().unwrap();
        assert_eq!(stored.text, "v2");
        assert_eq!(stored.id, second);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let repo = make_repo(IdentityMode::Upsert);
        let err = repo.save("APP-001", "text", &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, NoveltyError::Store(_)));
        assert!(err.to_string().contains("dimension mismatch"));
        assert_eq!(repo.count().unwrap(), 0);

        let err = repo.find_similar(&[1.0, 0.0, 0.0], None, 5).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn test_self_match_round_trip() {
        let repo = make_repo(IdentityMode::Upsert);
        let vector = unit(0.3, 0.5, 0.7, 0.1);
        repo.save("APP-001", "text", &vector).unwrap();

        let hits = repo.find_similar(&vector, None, 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "APP-001");
        assert!((hits[0].similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exclude_key_hides_own_record() {
        let repo = make_repo(IdentityMode::Upsert);
        let vector = unit(0.3, 0.5, 0.7, 0.1);
        repo.save("APP-001", "text", &vector).unwrap();
        repo.save("APP-002", "other", &unit(0.3, 0.5, 0.6, 0.2)).unwrap();

        let hits = repo.find_similar(&vector, Some("APP-001"), 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "APP-002");
    }

    #[test]
    fn test_ordering_and_limit() {
        let repo = make_repo(IdentityMode::Upsert);
        let query = unit(1.0, 0.0, 0.0, 0.0);
        repo.save("far", "t", &unit(0.1, 1.0, 0.0, 0.0)).unwrap();
        repo.save("near", "t", &unit(1.0, 0.1, 0.0, 0.0)).unwrap();
        repo.save("mid", "t", &unit(1.0, 1.0, 0.0, 0.0)).unwrap();

        let hits = repo.find_similar(&query, None, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "near");
        assert_eq!(hits[1].key, "mid");
        assert!(hits[0].similarity >= hits[1].similarity);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let repo = make_repo(IdentityMode::Append);
        let vector = unit(1.0, 0.0, 0.0, 0.0);
        repo.save("first", "t", &vector).unwrap();
        repo.save("second", "t", &vector).unwrap();

        let hits = repo.find_similar(&vector, None, 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "first");
        assert_eq!(hits[1].key, "second");
    }

    #[test]
    fn test_similarity_clamped_to_unit_interval() {
        let repo = make_repo(IdentityMode::Upsert);
        // Opposite vectors have cosine -1; similarity clamps to 0.
        repo.save("opposite", "t", &unit(-1.0, 0.0, 0.0, 0.0)).unwrap();

        let hits = repo.find_similar(&unit(1.0, 0.0, 0.0, 0.0), None, 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].similarity, 0.0);
    }

    #[test]
    fn test_similarity_rounded_to_four_decimals() {
        let repo = make_repo(IdentityMode::Upsert);
        repo.save("a", "t", &unit(1.0, 1.0, 0.0, 0.0)).unwrap();

        let hits = repo.find_similar(&unit(1.0, 0.0, 0.0, 0.0), None, 5).unwrap();
        // cos = 1/sqrt(2) = 0.70710678... rounds to 0.7071.
        assert_eq!(hits[0].similarity, 0.7071);
    }

    #[test]
    fn test_count_empty_corpus() {
        let repo = make_repo(IdentityMode::Upsert);
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.find_by_key("missing").unwrap().is_none());
        assert!(repo.find_similar(&unit(1.0, 0.0, 0.0, 0.0), None, 5).unwrap().is_empty());
    }
}
