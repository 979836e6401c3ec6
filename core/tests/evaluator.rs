//! Image evaluation: upload validation, reply parsing, and degrading to
//! the neutral score.

mod common;

use common::{rig, MemoryRepo, ScriptedHub};
use regenmon_core::{
    config::EvaluatorConfig,
    error::{PetError, PetResult},
    evaluator::{
        evaluate_or_default, parse_score_reply, validate_upload, EvaluationCategory,
        EvaluationResult, ImageEvaluator, ImageMime, Upload, VisionEvaluator, MAINTENANCE_FEEDBACK,
    },
    snapshot::{Species, StatKind},
};
use std::sync::atomic::{AtomicUsize, Ordering};

const LIMIT: usize = 5 * 1024 * 1024;

fn png(len: usize) -> Upload {
    Upload { bytes: vec![0x89; len], mime: "image/png".into() }
}

/// Answers with a fixed result, or fails like an outage.
struct StubEvaluator {
    answer: Option<EvaluationResult>,
    calls:  AtomicUsize,
}

impl StubEvaluator {
    fn answering(score: u8) -> Self {
        Self {
            answer: Some(EvaluationResult { score, feedback: "bien".into() }),
            calls:  AtomicUsize::new(0),
        }
    }

    fn down() -> Self {
        Self { answer: None, calls: AtomicUsize::new(0) }
    }
}

impl ImageEvaluator for StubEvaluator {
    async fn evaluate(&self, _upload: &Upload, _category: EvaluationCategory) -> PetResult<EvaluationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| PetError::Evaluation("upstream timed out".into()))
    }

    fn max_image_bytes(&self) -> usize {
        LIMIT
    }
}

#[test]
fn accepts_png_and_jpeg_within_limit() {
    assert_eq!(validate_upload(&png(10), LIMIT).unwrap(), ImageMime::Png);
    let jpeg = Upload { bytes: vec![0xFF; 10], mime: "image/jpeg".into() };
    assert_eq!(validate_upload(&jpeg, LIMIT).unwrap(), ImageMime::Jpeg);
    assert!(validate_upload(&png(LIMIT), LIMIT).is_ok());
}

#[test]
fn rejects_other_types_and_oversize() {
    let gif = Upload { bytes: vec![1; 10], mime: "image/gif".into() };
    assert!(matches!(validate_upload(&gif, LIMIT), Err(PetError::Validation(_))));
    assert!(matches!(validate_upload(&png(LIMIT + 1), LIMIT), Err(PetError::Validation(_))));
    assert!(matches!(validate_upload(&png(0), LIMIT), Err(PetError::Validation(_))));
}

#[test]
fn parses_score_and_feedback() {
    let r = parse_score_reply("Score: 85/100. ¡Gran trabajo con los colores!");
    assert_eq!(r.score, 85);
    assert_eq!(r.feedback, "¡Gran trabajo con los colores!");
}

#[test]
fn out_of_range_score_is_capped() {
    assert_eq!(parse_score_reply("Score: 250/100. Wow.").score, 100);
}

#[test]
fn reply_without_score_is_neutral() {
    let r = parse_score_reply("No puedo ver la imagen.");
    assert_eq!(r.score, 50);
    assert_eq!(r.feedback, "No puedo ver la imagen.");
}

#[tokio::test]
async fn outage_degrades_to_neutral() {
    let evaluator = StubEvaluator::down();
    let result = evaluate_or_default(&evaluator, &png(10), EvaluationCategory::Poems)
        .await
        .unwrap();
    assert_eq!(result.score, 50);
    assert_eq!(result.feedback, MAINTENANCE_FEEDBACK);
}

#[tokio::test]
async fn invalid_upload_never_reaches_the_evaluator() {
    let evaluator = StubEvaluator::answering(90);
    let bad = Upload { bytes: vec![1; 10], mime: "application/pdf".into() };
    let err = evaluate_or_default(&evaluator, &bad, EvaluationCategory::Letters)
        .await
        .unwrap_err();
    assert!(matches!(err, PetError::Validation(_)));
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn controller_applies_evaluated_score() {
    let r = rig(MemoryRepo::default(), ScriptedHub::default(), StatKind::Hunger);
    r.controller.start_game("Mochi", Species::Fire).await.unwrap();
    let evaluator = StubEvaluator::answering(30);

    let (result, pet) = r
        .controller
        .evaluate_upload(&evaluator, &png(10), EvaluationCategory::Design)
        .await
        .unwrap();
    assert_eq!(result.score, 30);
    assert_eq!(pet.stats.hunger, 95);
    assert_eq!(pet.stats.energy, 95);
}

#[test]
fn vision_client_builds_with_key() {
    let evaluator = VisionEvaluator::new("test-key".into(), &EvaluatorConfig::default());
    assert!(evaluator.is_ok());
    assert_eq!(evaluator.unwrap().max_image_bytes(), LIMIT);
}

#[test]
fn categories_use_their_wire_names() {
    assert_eq!(EvaluationCategory::Design.as_str(), "diseño");
    assert_eq!(serde_json::to_string(&EvaluationCategory::Poems).unwrap(), "\"poemas\"");
}
