//! Shared domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored proposal record, minus its raw embedding bytes.
///
/// The embedding itself stays inside the store; callers that need vectors go
/// through the similarity queries rather than reading them back directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Durable row identifier assigned by the store.
    pub id: i64,
    /// Natural identifier, e.g. an application number or title.
    pub key: String,
    /// Raw extracted text content.
    pub text: String,
    /// Embedding vector dimension recorded at write time.
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A nearest-neighbor hit returned by the similarity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborMatch {
    /// Key of the matched record.
    pub key: String,
    /// Cosine similarity in [0, 1], rounded to 4 decimals.
    pub similarity: f64,
}

/// Corpus identity policy, fixed per deployment.
///
/// A deployment runs exactly one mode against its table; switching modes is
/// a config change, never a per-request choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Keys are unique: re-ingesting a key replaces its text and embedding.
    #[default]
    Upsert,
    /// Every ingestion creates a new row; keys may repeat.
    Append,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mode_serde() {
        assert_eq!(
            serde_json::to_string(&IdentityMode::Upsert).unwrap(),
            "\"upsert\""
        );
        let mode: IdentityMode = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(mode, IdentityMode::Append);
    }

    #[test]
    fn test_neighbor_match_round_trip() {
        let neighbor = NeighborMatch {
            key: "APP-2024-001".to_string(),
            similarity: 0.8731,
        };
        let json = serde_json::to_string(&neighbor).unwrap();
        let back: NeighborMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, neighbor);
    }
}
