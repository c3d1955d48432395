//! Threshold decisions and best-match selection over reference embeddings.

use serde::Serialize;

use crate::embedding::{cosine_similarity, Embedding};
use crate::error::{Error, Result};

/// Default decision threshold, tuned for the upstream recognition model.
pub const DEFAULT_THRESHOLD: f32 = 0.35;

/// Running-maximum seed kept below the valid similarity range, so a candidate
/// scoring exactly -1.0 still overrides it and an empty scan stays
/// distinguishable from a worst-possible match.
const NO_MATCH_SENTINEL: f32 = -2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn is_accepted(self) -> bool {
        matches!(self, Decision::Accepted)
    }

    fn from_score(similarity: f32, threshold: f32) -> Self {
        // >= so a score sitting exactly on the threshold is accepted
        if similarity >= threshold {
            Decision::Accepted
        } else {
            Decision::Rejected
        }
    }
}

/// Outcome of a pairwise comparison. Produced fresh per request, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub similarity: f32,
    pub threshold: f32,
    pub decision: Decision,
}

/// Best candidate from an identification scan. Always names a key: an empty
/// scan is [`Error::StoreEmpty`], not a keyless result.
#[derive(Debug, Clone, Serialize)]
pub struct BestMatch {
    pub key: String,
    pub similarity: f32,
    pub threshold: f32,
    pub decision: Decision,
}

/// Reject non-finite or out-of-range thresholds before any similarity runs.
pub fn validate_threshold(threshold: f32) -> Result<f32> {
    if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidThreshold(threshold));
    }
    Ok(threshold)
}

/// One-to-one verification of two embeddings.
pub fn verify(reference: &Embedding, probe: &Embedding, threshold: f32) -> Result<MatchResult> {
    let threshold = validate_threshold(threshold)?;
    let similarity = cosine_similarity(reference, probe)?;
    Ok(MatchResult {
        similarity,
        threshold,
        decision: Decision::from_score(similarity, threshold),
    })
}

/// One-to-many identification: linear scan for the highest-scoring candidate.
///
/// Takes any deterministic candidate iterator, so a nearest-neighbor index can
/// replace the full scan later without touching the decision logic. Ties keep
/// the first candidate encountered. A below-threshold best match is still
/// reported with its key and score; only an empty scan is an error.
pub fn best_match<'a, I>(candidates: I, probe: &Embedding, threshold: f32) -> Result<BestMatch>
where
    I: IntoIterator<Item = (&'a String, &'a Embedding)>,
{
    let threshold = validate_threshold(threshold)?;

    let mut best_score = NO_MATCH_SENTINEL;
    let mut best_key: Option<&str> = None;

    for (key, embedding) in candidates {
        let score = cosine_similarity(embedding, probe)?;
        if score > best_score {
            best_score = score;
            best_key = Some(key);
        }
    }

    match best_key {
        Some(key) => Ok(BestMatch {
            key: key.to_string(),
            similarity: best_score,
            threshold,
            decision: Decision::from_score(best_score, threshold),
        }),
        None => Err(Error::StoreEmpty),
    }
}
