use colloquy_core::models::{ClassificationContext, EntityType, IntentType};
use colloquy_intent::IntentClassifier;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Empty and degenerate input ──

#[test]
fn empty_text_is_unknown_with_zero_confidence() {
    let classifier = IntentClassifier::new();
    for text in ["", "   ", "\n\t"] {
        let intent = classifier.classify(text, None);
        assert_eq!(intent.intent_type, IntentType::Unknown);
        assert_eq!(intent.confidence, 0.0);
        assert!(intent.entities.is_empty());
    }
}

#[test]
fn empty_text_is_a_validation_error_on_try_classify() {
    let classifier = IntentClassifier::new();
    let err = classifier.try_classify("  ", None).unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn gibberish_is_unknown() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("zxqv plorf", None);
    assert_eq!(intent.intent_type, IntentType::Unknown);
    assert_eq!(intent.confidence, 0.0);
    assert!(!classifier.is_confident(&intent));
}

// ── Scoring ──

#[test]
fn greeting_is_recognized_with_boundary_bonus() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("Hi there!", None);
    assert_eq!(intent.intent_type, IntentType::Greeting);
    assert!(approx(intent.confidence, 0.9));
    assert!(intent.flags.has_exclamation);
    assert_eq!(intent.flags.word_count, 2);
}

#[test]
fn product_inquiry_beats_general_question_on_tie() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("Tell me about laptops", None);
    assert_eq!(intent.intent_type, IntentType::ProductInquiry);
    assert_eq!(intent.entities[&EntityType::ProductType], vec!["laptop"]);
}

#[test]
fn trailing_question_mark_scores_unanchored() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("zorbs frobnicate?", None);
    assert_eq!(intent.intent_type, IntentType::GeneralQuestion);
    assert!(approx(intent.confidence, 0.8));
    assert!(intent.flags.has_question_mark);
}

#[test]
fn farewell_is_its_own_intent() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("Thanks, bye!", None);
    assert_eq!(intent.intent_type, IntentType::Farewell);
}

#[test]
fn contraction_spelled_after_normalization_matches() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("What's up", None);
    assert_eq!(intent.intent_type, IntentType::Greeting);
}

#[test]
fn sports_topic_recognized() {
    let classifier = IntentClassifier::new();
    let intent = classifier.classify("Did Liverpool win the football match", None);
    assert_eq!(intent.intent_type, IntentType::SportsTopic);
    assert_eq!(intent.entities[&EntityType::Sport], vec!["football"]);
    assert_eq!(intent.entities[&EntityType::Team], vec!["liverpool"]);
}

// ── Entities ──

#[test]
fn entities_are_lowercased_and_deduplicated() {
    let classifier = IntentClassifier::new();
    let entities = classifier.extract_entities("Apple laptop or a Dell LAPTOP, maybe apple again");
    assert_eq!(entities[&EntityType::Brand], vec!["apple", "dell"]);
    assert_eq!(entities[&EntityType::ProductType], vec!["laptop"]);
}

#[test]
fn price_ranges_are_extracted_from_original_text() {
    let classifier = IntentClassifier::new();
    let entities = classifier.extract_entities("a phone under $500 or maybe 300-400");
    let prices = &entities[&EntityType::PriceRange];
    assert!(prices.contains(&"under $500".to_string()));
    assert!(prices.contains(&"300-400".to_string()));
}

#[test]
fn multi_word_team_names_are_extracted() {
    let classifier = IntentClassifier::new();
    let entities = classifier.extract_entities("Real Madrid vs Manchester United");
    assert_eq!(
        entities[&EntityType::Team],
        vec!["real madrid", "manchester united"]
    );
}

// ── Follow-up heuristic ──

#[test]
fn follow_up_requires_previous_intent() {
    let classifier = IntentClassifier::new();
    let no_context = classifier.classify("what about tablets", None);
    assert!(!no_context.flags.is_follow_up);

    let fresh = ClassificationContext::default();
    let intent = classifier.classify("what about tablets", Some(&fresh));
    assert!(!intent.flags.is_follow_up);
}

#[test]
fn discourse_marker_marks_follow_up() {
    let classifier = IntentClassifier::new();
    let ctx = ClassificationContext {
        previous_intent: Some(IntentType::ProductInquiry),
        session_length: 2,
    };
    let intent = classifier.classify("What about tablets?", Some(&ctx));
    assert!(intent.flags.is_follow_up);
    assert_eq!(intent.flags.previous_intent, Some(IntentType::ProductInquiry));
    assert_eq!(intent.flags.session_length, 2);
}

#[test]
fn marker_must_be_a_whole_word() {
    let classifier = IntentClassifier::new();
    let ctx = ClassificationContext {
        previous_intent: Some(IntentType::Greeting),
        session_length: 1,
    };
    // "android" and "candy" contain "and" but are not the marker.
    let intent = classifier.classify("android candy", Some(&ctx));
    assert!(!intent.flags.is_follow_up);
}

#[test]
fn entities_without_intent_mark_follow_up() {
    let classifier = IntentClassifier::new();
    let ctx = ClassificationContext {
        previous_intent: Some(IntentType::ProductInquiry),
        session_length: 3,
    };
    let intent = classifier.classify("Samsung", Some(&ctx));
    assert_eq!(intent.intent_type, IntentType::Unknown);
    assert!(intent.flags.is_follow_up);
}
