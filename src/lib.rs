pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod store;

// Re-export the core types for convenience
pub use embedding::{cosine_similarity, Embedding};
pub use engine::Engine;
pub use error::{Error, Result};
pub use extract::{BoundingBox, DetectedFace, FaceExtractor, JsonExtractor};
pub use matcher::{BestMatch, Decision, MatchResult, DEFAULT_THRESHOLD};
pub use store::{FaceStore, IdentityRecord};
