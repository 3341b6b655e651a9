//! End-to-end behaviour of the stabilization engine

use std::sync::Arc;

use gesture_text::classifier::{
    ClassificationResult, Label, LabeledCorpus, RejectionClassifier, Sample,
};
use gesture_text::config::EngineConfig;
use gesture_text::features::{self, LandmarkFrame, Point3, RawLandmarks, LANDMARK_COUNT};
use gesture_text::state::{CommitState, Gesture, TextMutation};
use gesture_text::{Observation, StabilizationEngine};

fn label_engine() -> StabilizationEngine {
    StabilizationEngine::new(&EngineConfig::default(), None)
}

fn gesture(label: &str) -> Observation {
    Observation::Gesture(Some(label.into()))
}

fn feed(engine: &mut StabilizationEngine, label: &str, cycles: usize, area: f64) -> usize {
    (0..cycles)
        .filter(|_| engine.ingest(&gesture(label), area).unwrap().accepted)
        .count()
}

/// A fist-ish and an open-hand-ish pose, as raw landmark points
fn pose(spread: f64, offset: f64) -> Vec<Point3> {
    (0..LANDMARK_COUNT)
        .map(|i| {
            let t = i as f64;
            Point3 {
                x: offset + (t * 0.7).sin() * spread,
                y: offset + (t * 0.3).cos() * spread * 0.5 + t * 0.002,
                z: (t * 0.1).sin() * 0.01,
            }
        })
        .collect()
}

fn corpus_engine() -> StabilizationEngine {
    let mut samples = Vec::new();
    for (label, spread) in [("A", 0.05), ("B", 0.15)] {
        for k in 0..5 {
            let frame = LandmarkFrame::from_points(pose(spread, 0.3 + k as f64 * 0.01)).unwrap();
            samples.push(Sample {
                label: label.into(),
                features: features::normalize(&frame).as_slice().to_vec(),
            });
        }
    }
    let corpus = LabeledCorpus::from_samples(samples).unwrap();
    let config = EngineConfig::default();
    let classifier = RejectionClassifier::from_corpus(corpus, &config);
    StabilizationEngine::new(&config, Some(Arc::new(classifier)))
}

#[test]
fn test_six_stable_b_cycles_commit_once() {
    let mut engine = label_engine();
    assert_eq!(feed(&mut engine, "B", 6, 0.2), 1);
    assert_eq!(engine.text(), "B");
}

#[test]
fn test_held_letter_does_not_flood() {
    let mut engine = label_engine();
    // five full thresholds' worth of the same letter at constant hand size
    assert_eq!(feed(&mut engine, "B", 30, 0.2), 1);
    assert_eq!(engine.text(), "B");
}

#[test]
fn test_space_after_letter_only_once() {
    let mut engine = label_engine();
    feed(&mut engine, "A", 6, 0.2);

    // a rejection cycle breaks up the A majority before SPACE
    engine.ingest(&Observation::Gesture(None), 0.2).unwrap();
    assert_eq!(feed(&mut engine, "SPACE", 24, 0.2), 1);
    assert_eq!(engine.text(), "A ");
}

#[test]
fn test_repeat_requires_bigger_hand() {
    let mut engine = label_engine();
    feed(&mut engine, "A", 6, 0.10);
    assert_eq!(
        engine.commit_state(),
        &CommitState {
            last_accepted_gesture: Some("A".into()),
            last_accepted_area: 0.10,
        }
    );

    assert_eq!(feed(&mut engine, "A", 6, 0.12), 0);
    assert_eq!(engine.text(), "A");

    assert_eq!(feed(&mut engine, "A", 6, 0.14), 1);
    assert_eq!(engine.text(), "AA");
}

#[test]
fn test_delete_on_empty_buffer() {
    let mut engine = label_engine();
    assert_eq!(feed(&mut engine, "DEL", 12, 0.2), 0);
    assert_eq!(engine.text(), "");
    assert_eq!(engine.commit_state().last_accepted_gesture, None);
}

#[test]
fn test_letter_then_delete() {
    let mut engine = label_engine();
    feed(&mut engine, "C", 6, 0.2);
    engine.ingest(&Observation::Gesture(None), 0.2).unwrap();

    let outcomes: Vec<_> = (0..6)
        .map(|_| engine.ingest(&gesture("DEL"), 0.2).unwrap())
        .collect();
    assert_eq!(outcomes[5].committed, Some(TextMutation::Delete { removed: 'C' }));
    assert_eq!(engine.text(), "");
}

#[test]
fn test_hand_leaving_frame_allows_same_letter_again() {
    let config = EngineConfig::default();
    let mut engine = label_engine();
    feed(&mut engine, "A", 6, 0.2);

    // nothing recognised for a full threshold: the gate fires on the empty
    // sentinel and repeat history is cleared
    for _ in 0..config.stability_threshold {
        engine.ingest(&Observation::Gesture(None), 0.0).unwrap();
    }
    assert_eq!(engine.commit_state().last_accepted_gesture, None);

    assert_eq!(feed(&mut engine, "A", 6, 0.2), 1);
    assert_eq!(engine.text(), "AA");
}

#[test]
fn test_blank_gesture_is_nothing_recognised() {
    let mut engine = label_engine();
    feed(&mut engine, "A", 6, 0.2);

    for _ in 0..12 {
        let outcome = engine.ingest(&gesture(""), 0.2).unwrap();
        assert_eq!(outcome.gesture, None);
        assert!(!outcome.accepted);
        assert_eq!(outcome.committed, None);
    }
    assert_eq!(engine.text(), "A");
    assert_eq!(engine.commit_state().last_accepted_gesture, None);

    let blank = ClassificationResult::Label { label: "  ".into(), confidence: Some(0.9) };
    assert!(!engine.step(&blank, 0.2).accepted);
    assert_eq!(engine.window_len(), 0);
}

#[test]
fn test_single_rejection_resets_vote() {
    let mut engine = label_engine();
    for _ in 0..4 {
        engine.ingest(&gesture("A"), 0.2).unwrap();
    }
    engine.ingest(&Observation::Gesture(None), 0.2).unwrap();
    assert_eq!(engine.window_len(), 0);

    let outcome = engine.ingest(&gesture("B"), 0.2).unwrap();
    assert_eq!(outcome.gesture, Some(Label::from("B")));
}

#[test]
fn test_gate_never_fires_early() {
    let config = EngineConfig {
        stability_threshold: 10,
        window_capacity: 10,
        ..EngineConfig::default()
    };
    let mut engine = StabilizationEngine::new(&config, None);

    for cycle in 1..=9u32 {
        let outcome = engine.ingest(&gesture("K"), 0.2).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(engine.stability(), (Some(&Gesture::Sign("K".into())), cycle));
    }
    assert!(engine.ingest(&gesture("K"), 0.2).unwrap().accepted);
    assert_eq!(engine.stability().1, 0);
}

#[test]
fn test_reset_is_idempotent() {
    let mut engine = label_engine();
    feed(&mut engine, "A", 8, 0.2);

    assert_eq!(engine.reset(), "");
    let once = (
        engine.text().to_owned(),
        engine.commit_state().clone(),
        engine.window_len(),
        engine.stability().1,
    );

    assert_eq!(engine.reset(), "");
    let twice = (
        engine.text().to_owned(),
        engine.commit_state().clone(),
        engine.window_len(),
        engine.stability().1,
    );

    assert_eq!(once, twice);
    assert_eq!(engine.stability().0, None);
}

#[test]
fn test_landmarks_classified_by_corpus() {
    let mut engine = corpus_engine();
    assert!(engine.has_classifier());

    let raw = RawLandmarks::Points(pose(0.15, 0.32));
    let obs = Observation::Landmarks(raw);
    let outcomes: Vec<_> = (0..6).map(|_| engine.ingest(&obs, 0.2).unwrap()).collect();

    assert_eq!(outcomes[0].gesture, Some(Label::from("B")));
    assert!(outcomes[5].accepted);
    assert_eq!(engine.text(), "B");
}

#[test]
fn test_unfamiliar_pose_rejected_by_distance() {
    let mut engine = corpus_engine();

    // a straight line of points looks nothing like either training pose
    let line: Vec<Point3> = (0..LANDMARK_COUNT)
        .map(|i| Point3 { x: i as f64 * 0.01, y: 0.5, z: 0.0 })
        .collect();
    let obs = Observation::Landmarks(RawLandmarks::Points(line));

    for _ in 0..12 {
        let outcome = engine.ingest(&obs, 0.2).unwrap();
        assert_eq!(outcome.gesture, None);
        assert!(!outcome.accepted);
    }
    assert_eq!(engine.text(), "");
}

#[test]
fn test_step_with_explicit_results() {
    let mut engine = label_engine();
    let low = ClassificationResult::Rejected;
    for _ in 0..20 {
        assert!(!engine.step(&low, 0.2).accepted);
    }
    assert_eq!(engine.text(), "");
}
