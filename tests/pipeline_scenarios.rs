mod common;

use std::sync::atomic::Ordering;

use common::{app, detection, face_shape_scores, png_upload, ScriptedLoader};
use style_mate::classify::StubClassifier;
use style_mate::detect::StubDetector;
use style_mate::{AdvisoryKind, BoundingBox, Category, ModelSlot, PassOutcome, RenderEvent};

fn recommendations(events: &[RenderEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            RenderEvent::ShowRecommendation(rec) => Some(rec.label.as_str()),
            _ => None,
        })
        .collect()
}

fn advisory_detail(events: &[RenderEvent], kind: AdvisoryKind) -> Option<&str> {
    events.iter().find_map(|e| match e {
        RenderEvent::ShowAdvisory { kind: k, detail } if *k == kind => Some(detail.as_str()),
        _ => None,
    })
}

#[test]
fn small_face_box_ends_pass_without_classifying() {
    let shape = face_shape_scores(0.9);
    let calls = shape.call_counter();
    let loader = ScriptedLoader::new(shape, StubClassifier::personal_tone())
        .with_detector(StubDetector::fixed(vec![detection(10.0, 10.0, 40.0, 40.0)]));
    let mut app = app(loader);

    app.load_upload(&png_upload(320, 240)).unwrap();
    app.switch_model(ModelSlot::FaceShape);
    let outcome = app.process_upload().unwrap();

    assert_eq!(
        outcome,
        PassOutcome::FaceTooSmall {
            face: BoundingBox::new(10.0, 10.0, 40.0, 40.0)
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let events = app.sink().events();
    assert!(advisory_detail(events, AdvisoryKind::FaceTooSmall).is_some());
    assert!(recommendations(events).is_empty());
}

#[test]
fn confident_face_shape_renders_ranked_list_and_one_recommendation() {
    let loader = ScriptedLoader::new(face_shape_scores(0.82), StubClassifier::personal_tone())
        .with_detector(StubDetector::fixed(vec![detection(80.0, 40.0, 150.0, 170.0)]));
    let mut app = app(loader);

    app.load_upload(&png_upload(320, 260)).unwrap();
    app.switch_model(ModelSlot::FaceShape);
    let outcome = app.process_upload().unwrap();

    assert!(matches!(
        outcome,
        PassOutcome::Recommended { ref label, .. } if label == "Oval"
    ));
    let events = app.sink().events();
    let ranked = events
        .iter()
        .position(|e| matches!(e, RenderEvent::ShowRankedResults { .. }))
        .expect("ranked list rendered");
    match &events[ranked] {
        RenderEvent::ShowRankedResults { model, predictions } => {
            assert_eq!(model, "Face Type Analysis");
            assert_eq!(predictions.len(), 5);
            assert_eq!(predictions[0].label, "Oval");
            assert!(predictions
                .windows(2)
                .all(|pair| pair[0].probability >= pair[1].probability));
        }
        _ => unreachable!(),
    }
    assert!(matches!(
        events[ranked + 1],
        RenderEvent::ShowRecommendation(_)
    ));
    assert_eq!(recommendations(events), vec!["Oval"]);
}

#[test]
fn low_confidence_tone_shows_percentage_only() {
    let tone = StubClassifier::scripted("scripted-tone", &[("Warm", 0.55), ("Cool", 0.45)]);
    let loader = ScriptedLoader::new(StubClassifier::face_shape(), tone);
    let mut app = app(loader);

    app.load_upload(&png_upload(300, 300)).unwrap();
    app.switch_model(ModelSlot::PersonalTone);
    let outcome = app.process_upload().unwrap();

    assert_eq!(
        outcome,
        PassOutcome::LowConfidence {
            top_probability: 0.55
        }
    );
    let events = app.sink().events();
    let detail = advisory_detail(events, AdvisoryKind::LowConfidence).expect("advisory");
    assert!(detail.contains("55.0%"), "detail was {detail}");
    assert!(recommendations(events).is_empty());
    assert!(!events
        .iter()
        .any(|e| matches!(e, RenderEvent::ShowRankedResults { .. })));
}

#[test]
fn threshold_is_inclusive_at_sixty_percent() {
    for (top, recommended) in [(0.60, true), (0.599, false)] {
        let loader = ScriptedLoader::new(face_shape_scores(top), StubClassifier::personal_tone());
        let mut app = app(loader);
        app.load_upload(&png_upload(300, 300)).unwrap();
        app.switch_model(ModelSlot::FaceShape);
        let outcome = app.process_upload().unwrap();
        assert_eq!(outcome.is_recommended(), recommended, "top {top}");
        assert_eq!(
            recommendations(app.sink().events()).len(),
            usize::from(recommended)
        );
    }
}

#[test]
fn manual_selection_works_without_a_model() {
    let mut app = app(ScriptedLoader::broken());
    let rec = app.manual_select(Category::PersonalTone, "Cool").unwrap();

    assert_eq!(rec.resolved_label, "Cool");
    assert_eq!(app.session().active_slot(), None);
    let events = app.sink().events();
    assert_eq!(
        advisory_detail(events, AdvisoryKind::ManualSelection),
        Some("Manually selected: Cool")
    );
    assert_eq!(recommendations(events), vec!["Cool"]);
}

#[test]
fn same_upload_and_slot_reach_the_same_decision() {
    let loader = ScriptedLoader::new(StubClassifier::face_shape(), StubClassifier::personal_tone());
    let mut app = app(loader);
    app.load_upload(&png_upload(256, 256)).unwrap();
    app.switch_model(ModelSlot::PersonalTone);

    let first = app.process_upload().unwrap();
    let second = app.process_upload().unwrap();
    assert_eq!(first, second);
}

#[test]
fn no_face_found_is_an_advisory() {
    let loader = ScriptedLoader::new(StubClassifier::face_shape(), StubClassifier::personal_tone())
        .with_detector(StubDetector::none());
    let mut app = app(loader);
    app.load_upload(&png_upload(200, 200)).unwrap();
    app.switch_model(ModelSlot::FaceShape);

    assert_eq!(app.process_upload().unwrap(), PassOutcome::NoFace);
    assert!(advisory_detail(app.sink().events(), AdvisoryKind::NoFaceDetected).is_some());
}

#[test]
fn missing_detector_analyses_the_whole_upload() {
    let shape = face_shape_scores(0.75);
    let calls = shape.call_counter();
    let mut loader = ScriptedLoader::new(shape, StubClassifier::personal_tone());
    loader.detector = None;
    let mut app = app(loader);

    app.load_upload(&png_upload(180, 120)).unwrap();
    app.switch_model(ModelSlot::FaceShape);
    let outcome = app.process_upload().unwrap();

    assert!(app.is_degraded());
    assert!(outcome.is_recommended());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
