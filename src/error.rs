use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Closed set of failures crossing out of the engine. The network layer owns
/// the mapping to status codes; nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// Extraction produced zero faces for an image that requires one.
    #[error("no face detected in the image")]
    NoFaceDetected,

    /// Identification was attempted with zero registered identities. Distinct
    /// from a best match falling below the threshold.
    #[error("no registered identities to match against")]
    StoreEmpty,

    /// A zero-magnitude vector makes cosine similarity undefined.
    #[error("embedding has zero magnitude, similarity is undefined")]
    DegenerateEmbedding,

    /// Embeddings from different models do not interoperate.
    #[error("embedding dimensions differ ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    /// Thresholds must be finite and within the similarity range.
    #[error("threshold {0} is not a finite value in [-1, 1]")]
    InvalidThreshold(f32),

    /// The extraction collaborator handed back something unusable.
    #[error("face extraction failed: {0}")]
    Extraction(String),

    /// Durable load/save failed. Fatal for the current request.
    #[error("face store i/o at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding the persisted store failed.
    #[error("face store codec: {0}")]
    Codec(#[from] postcard::Error),
}
