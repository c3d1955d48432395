use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::{Error, Result};

/// Axis-aligned face location within the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One face found by the extraction model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    pub embedding: Embedding,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

/// Black-box extraction collaborator: image bytes in, detected faces out.
///
/// Upstream models usually return faces in descending-confidence order, but
/// nothing here relies on that; the engine selects by confidence itself. An
/// empty result is legal and is mapped to [`Error::NoFaceDetected`] by the
/// engine, not here.
pub trait FaceExtractor {
    fn extract(&self, image: &[u8]) -> Result<Vec<DetectedFace>>;
}

/// Pick the primary face explicitly by highest confidence rather than by
/// position in the list.
pub fn primary_face(faces: &[DetectedFace]) -> Result<&DetectedFace> {
    faces
        .iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .ok_or(Error::NoFaceDetected)
}

/// Stand-in extractor that parses the collaborator's JSON wire shape directly,
/// for running the engine against precomputed extraction output.
pub struct JsonExtractor;

impl FaceExtractor for JsonExtractor {
    fn extract(&self, image: &[u8]) -> Result<Vec<DetectedFace>> {
        serde_json::from_slice(image).map_err(|e| Error::Extraction(e.to_string()))
    }
}
