//! Novelty scoring math and its categorical interpretation.

use serde::{Deserialize, Serialize};

/// Compute a 0-100 novelty score from neighbor similarities.
///
/// An empty slice means there was nothing to compare against, which is
/// maximal novelty by definition: exactly 100.0. Otherwise the score is
/// `(1 - mean similarity) * 100`, rounded to 2 decimals.
pub fn novelty_score(similarities: &[f64]) -> f64 {
    if similarities.is_empty() {
        return 100.0;
    }

    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    ((1.0 - mean) * 100.0 * 100.0).round() / 100.0
}

/// Categorical interpretation of a novelty score.
///
/// Bands use inclusive lower bounds, so a boundary value belongs to the
/// higher band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    #[serde(rename = "Highly Novel")]
    HighlyNovel,
    #[serde(rename = "Novel")]
    Novel,
    #[serde(rename = "Moderately Novel")]
    ModeratelyNovel,
    #[serde(rename = "Low Novelty")]
    LowNovelty,
    #[serde(rename = "Very Low Novelty")]
    VeryLowNovelty,
}

impl Interpretation {
    /// Classify a 0-100 novelty score.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Interpretation::HighlyNovel
        } else if score >= 60.0 {
            Interpretation::Novel
        } else if score >= 40.0 {
            Interpretation::ModeratelyNovel
        } else if score >= 20.0 {
            Interpretation::LowNovelty
        } else {
            Interpretation::VeryLowNovelty
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interpretation::HighlyNovel => "Highly Novel",
            Interpretation::Novel => "Novel",
            Interpretation::ModeratelyNovel => "Moderately Novel",
            Interpretation::LowNovelty => "Low Novelty",
            Interpretation::VeryLowNovelty => "Very Low Novelty",
        }
    }
}

impl std::fmt::Display for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
