use anyhow::Result;
use serde_json::json;
use veriface::{Engine, Error, FaceStore, JsonExtractor, DEFAULT_THRESHOLD};

/// Build the extraction collaborator's JSON output for a list of
/// (embedding, confidence) faces.
fn extraction_payload(faces: &[(&[f32], f32)]) -> Vec<u8> {
    let faces: Vec<_> = faces
        .iter()
        .map(|(embedding, confidence)| {
            json!({
                "embedding": embedding,
                "confidence": confidence,
                "bounding_box": {"x1": 10.0, "y1": 20.0, "x2": 110.0, "y2": 140.0}
            })
        })
        .collect();
    serde_json::to_vec(&faces).unwrap()
}

fn single_face(embedding: &[f32]) -> Vec<u8> {
    extraction_payload(&[(embedding, 0.95)])
}

fn open_engine(dir: &tempfile::TempDir) -> Engine<JsonExtractor> {
    Engine::new(JsonExtractor, FaceStore::open(dir.path().join("store")))
}

#[test]
fn test_register_then_identify_same_embedding() -> Result<()> {
    env_logger::try_init().ok();
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    let emb_a = [0.6f32, 0.8, 0.0];
    engine.register("alice", &single_face(&emb_a))?;

    let report = engine.identify(&single_face(&emb_a), DEFAULT_THRESHOLD)?;
    assert_eq!(report.best_match, "alice");
    assert_eq!(report.status, "SUCCESS");
    assert!((report.similarity - 1.0).abs() < 1e-5, "got {}", report.similarity);
    assert_eq!(report.threshold_used, DEFAULT_THRESHOLD);
    Ok(())
}

#[test]
fn test_identify_empty_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    let result = engine.identify(&single_face(&[1.0, 0.0]), DEFAULT_THRESHOLD);
    assert!(matches!(result, Err(Error::StoreEmpty)));
    Ok(())
}

#[test]
fn test_identify_reports_failed_best_match_below_threshold() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    engine.register("alice", &single_face(&[1.0, 0.0]))?;

    // orthogonal query scores 0.0, well below the default threshold
    let report = engine.identify(&single_face(&[0.0, 1.0]), DEFAULT_THRESHOLD)?;
    assert_eq!(report.status, "FAILED");
    assert_eq!(report.best_match, "alice");
    assert!(report.similarity.abs() < 1e-6);
    Ok(())
}

#[test]
fn test_identify_picks_closest_of_many() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    engine.register("alice", &single_face(&[1.0, 0.0]))?;
    engine.register("bob", &single_face(&[0.0, 1.0]))?;
    engine.register("carol", &single_face(&[0.7, 0.7]))?;

    let report = engine.identify(&single_face(&[0.95, 0.05]), DEFAULT_THRESHOLD)?;
    assert_eq!(report.best_match, "alice");
    assert_eq!(report.status, "SUCCESS");
    Ok(())
}

#[test]
fn test_overwrite_uses_only_new_embedding() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    engine.register("alice", &single_face(&[1.0, 0.0]))?;
    engine.register("alice", &single_face(&[0.0, 1.0]))?;

    // the old embedding would have matched this query perfectly
    let report = engine.identify(&single_face(&[1.0, 0.0]), DEFAULT_THRESHOLD)?;
    assert_eq!(report.best_match, "alice");
    assert_eq!(report.status, "FAILED");
    assert!(report.similarity.abs() < 1e-6);
    Ok(())
}

#[test]
fn test_verify_different_person() -> Result<()> {
    env_logger::try_init().ok();
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    // unit vectors with dot product 0.10
    let emb_1 = [1.0f32, 0.0];
    let emb_2 = [0.1f32, (1.0f32 - 0.01).sqrt()];

    let report = engine.verify(&single_face(&emb_1), &single_face(&emb_2), 0.35)?;
    assert_eq!(report.verification_result, "different person");
    assert!((report.similarity_score - 0.10).abs() < 1e-5, "got {}", report.similarity_score);
    assert_eq!(report.threshold_used, 0.35);
    Ok(())
}

#[test]
fn test_verify_same_person_echoes_face_metadata() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    // two faces in image 1; the higher-confidence one carries the matching
    // embedding even though it is listed second
    let payload_1 = extraction_payload(&[(&[0.0, 1.0], 0.4), (&[1.0, 0.0], 0.9)]);
    let payload_2 = single_face(&[1.0, 0.0]);

    let report = engine.verify(&payload_1, &payload_2, 0.35)?;
    assert_eq!(report.verification_result, "same person");
    assert_eq!(report.image_1_faces.count, 2);
    assert_eq!(report.image_1_faces.primary_face.confidence, 0.9);
    assert_eq!(report.image_2_faces.count, 1);
    assert_eq!(report.image_2_faces.primary_face.bounding_box.x2, 110.0);
    Ok(())
}

#[test]
fn test_no_face_detected_before_any_similarity() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    let empty = extraction_payload(&[]);
    assert!(matches!(
        engine.verify(&empty, &single_face(&[1.0, 0.0]), 0.35),
        Err(Error::NoFaceDetected)
    ));
    assert!(matches!(
        engine.identify(&empty, 0.35),
        Err(Error::NoFaceDetected)
    ));
    assert!(matches!(
        engine.register("alice", &empty),
        Err(Error::NoFaceDetected)
    ));
    Ok(())
}

#[test]
fn test_registration_picks_most_confident_face() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    let payload = extraction_payload(&[(&[0.0, 1.0], 0.5), (&[1.0, 0.0], 0.99)]);
    let report = engine.register("alice", &payload)?;
    assert_eq!(report.faces_detected, 2);
    assert_eq!(report.confidence, 0.99);

    let lookup = engine.identify(&single_face(&[1.0, 0.0]), DEFAULT_THRESHOLD)?;
    assert_eq!(lookup.status, "SUCCESS");
    Ok(())
}

#[test]
fn test_degenerate_registration_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    engine.register("alice", &single_face(&[1.0, 0.0]))?;

    // a zero-magnitude embedding must never enter the store; once there it
    // would fail every later identification
    assert!(matches!(
        engine.register("mallory", &single_face(&[0.0, 0.0])),
        Err(Error::DegenerateEmbedding)
    ));

    let report = engine.identify(&single_face(&[1.0, 0.0]), DEFAULT_THRESHOLD)?;
    assert_eq!(report.best_match, "alice");
    assert_eq!(report.status, "SUCCESS");
    Ok(())
}

#[test]
fn test_mismatched_dimension_registration_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    engine.register("alice", &single_face(&[1.0, 0.0]))?;
    assert!(matches!(
        engine.register("bob", &single_face(&[1.0, 0.0, 0.0])),
        Err(Error::DimensionMismatch { .. })
    ));

    let report = engine.identify(&single_face(&[1.0, 0.0]), DEFAULT_THRESHOLD)?;
    assert_eq!(report.best_match, "alice");
    Ok(())
}

#[test]
fn test_invalid_threshold_rejected_at_entry() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let engine = open_engine(&dir);

    let payload = single_face(&[1.0, 0.0]);
    assert!(matches!(
        engine.verify(&payload, &payload, f32::NAN),
        Err(Error::InvalidThreshold(_))
    ));
    assert!(matches!(
        engine.identify(&payload, 2.0),
        Err(Error::InvalidThreshold(_))
    ));
    Ok(())
}

#[test]
fn test_store_survives_engine_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let engine = open_engine(&dir);
        engine.register("alice", &single_face(&[0.6, 0.8]))?;
    }

    let engine = open_engine(&dir);
    let report = engine.identify(&single_face(&[0.6, 0.8]), DEFAULT_THRESHOLD)?;
    assert_eq!(report.best_match, "alice");
    assert_eq!(report.status, "SUCCESS");
    Ok(())
}
