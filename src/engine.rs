//! Image-level operations: wires the extraction collaborator to the matcher
//! and the store, and shapes the reports handed back to the caller.

use log::info;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::{primary_face, BoundingBox, DetectedFace, FaceExtractor};
use crate::matcher::{self, Decision};
use crate::store::FaceStore;

/// Per-image face metadata echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FaceSummary {
    pub count: usize,
    pub primary_face: PrimaryFace,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrimaryFace {
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub verification_result: &'static str,
    pub similarity_score: f32,
    pub threshold_used: f32,
    pub image_1_faces: FaceSummary,
    pub image_2_faces: FaceSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub key: String,
    pub faces_detected: usize,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentificationReport {
    pub status: &'static str,
    pub best_match: String,
    pub similarity: f32,
    pub threshold_used: f32,
}

/// Matching engine over an extraction collaborator and an embedding store.
pub struct Engine<E> {
    extractor: E,
    store: FaceStore,
}

impl<E: FaceExtractor> Engine<E> {
    pub fn new(extractor: E, store: FaceStore) -> Self {
        Self { extractor, store }
    }

    /// Compare two images and decide whether they show the same person.
    pub fn verify(
        &self,
        image_1: &[u8],
        image_2: &[u8],
        threshold: f32,
    ) -> Result<VerificationReport> {
        let threshold = matcher::validate_threshold(threshold)?;

        let faces_1 = self.detect(image_1)?;
        let faces_2 = self.detect(image_2)?;
        let primary_1 = primary_face(&faces_1)?;
        let primary_2 = primary_face(&faces_2)?;

        let result = matcher::verify(&primary_1.embedding, &primary_2.embedding, threshold)?;
        info!(
            "verification: similarity {:.4} (threshold: {:.2})",
            result.similarity, threshold
        );

        Ok(VerificationReport {
            verification_result: verification_label(result.decision),
            similarity_score: result.similarity,
            threshold_used: result.threshold,
            image_1_faces: summarize(&faces_1, primary_1),
            image_2_faces: summarize(&faces_2, primary_2),
        })
    }

    /// Register (or overwrite) an identity from the primary face of an image.
    ///
    /// A degenerate embedding is rejected here rather than at match time:
    /// once stored it would fail every later identification against the
    /// whole store, and there is no per-key delete to recover with.
    pub fn register(&self, key: &str, image: &[u8]) -> Result<RegistrationReport> {
        let faces = self.detect(image)?;
        let primary = primary_face(&faces)?;
        if primary.embedding.is_degenerate() {
            return Err(Error::DegenerateEmbedding);
        }

        self.store.upsert(key, primary.embedding.clone())?;
        info!(
            "registered identity {} from {} detected face(s)",
            key,
            faces.len()
        );

        Ok(RegistrationReport {
            key: key.to_string(),
            faces_detected: faces.len(),
            confidence: primary.confidence,
        })
    }

    /// Find the best-matching registered identity for the primary face of an
    /// image.
    pub fn identify(&self, image: &[u8], threshold: f32) -> Result<IdentificationReport> {
        let threshold = matcher::validate_threshold(threshold)?;

        let faces = self.detect(image)?;
        let primary = primary_face(&faces)?;

        let records = self.store.load()?;
        let result = matcher::best_match(&records, &primary.embedding, threshold)?;
        info!(
            "identification: best {} at {:.4} (threshold: {:.2})",
            result.key, result.similarity, threshold
        );

        Ok(IdentificationReport {
            status: identification_label(result.decision),
            best_match: result.key,
            similarity: result.similarity,
            threshold_used: result.threshold,
        })
    }

    fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>> {
        let faces = self.extractor.extract(image)?;
        if faces.is_empty() {
            return Err(Error::NoFaceDetected);
        }
        Ok(faces)
    }
}

fn summarize(faces: &[DetectedFace], primary: &DetectedFace) -> FaceSummary {
    FaceSummary {
        count: faces.len(),
        primary_face: PrimaryFace {
            bounding_box: primary.bounding_box,
            confidence: primary.confidence,
        },
    }
}

fn verification_label(decision: Decision) -> &'static str {
    if decision.is_accepted() {
        "same person"
    } else {
        "different person"
    }
}

fn identification_label(decision: Decision) -> &'static str {
    if decision.is_accepted() {
        "SUCCESS"
    } else {
        "FAILED"
    }
}
