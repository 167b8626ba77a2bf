use std::collections::HashSet;

use moodpick::rationale::{
    contains_spoiler, generate_delta_explainer, generate_rationale, generate_when_to_watch,
    sanitize_text, validate_rationale, DeltaKind, MAX_RATIONALE_LENGTH, SPOILER_KEYWORDS,
};
use moodpick::{Answers, Format, Pace, UserState};

const STATES: [UserState; 3] = [UserState::Light, UserState::Heavy, UserState::Escape];
const PACES: [Pace; 2] = [Pace::Slow, Pace::Fast];

fn answers(state: UserState, pace: Pace) -> Answers {
    Answers::new(state, pace, Format::Movie)
}

#[test]
fn rationale_is_deterministic_for_same_inputs() {
    let a = answers(UserState::Heavy, Pace::Slow);
    let first = generate_rationale("sel-42", &a);
    let second = generate_rationale("sel-42", &a);
    assert_eq!(first, second);
}

#[test]
fn rationale_varies_across_selection_ids() {
    let mut distinct: HashSet<String> = HashSet::new();
    for state in STATES {
        for i in 0..10 {
            let id = format!("sel-{}", i);
            distinct.insert(generate_rationale(&id, &answers(state, Pace::Slow)));
        }
    }
    assert!(distinct.len() >= 2, "only {} distinct rationales", distinct.len());
}

#[test]
fn rationale_respects_length_budget() {
    for state in STATES {
        for pace in PACES {
            for i in 0..20 {
                let id = format!("sel-{}", i);
                let text = generate_rationale(&id, &answers(state, pace));
                assert!(text.chars().count() <= MAX_RATIONALE_LENGTH);
                assert!(!text.is_empty());
            }
        }
    }
}

#[test]
fn generated_text_is_spoiler_free() {
    for i in 0..100 {
        let state = STATES[i % STATES.len()];
        let pace = PACES[i % PACES.len()];
        let id = format!("sample-{}", i);
        let a = answers(state, pace);

        let rationale = generate_rationale(&id, &a).to_lowercase();
        let when = generate_when_to_watch(&id, &a).to_lowercase();
        for keyword in SPOILER_KEYWORDS {
            assert!(!rationale.contains(keyword), "spoiler {:?} in rationale", keyword);
            assert!(!when.contains(keyword), "spoiler {:?} in when-to-watch", keyword);
        }
    }
}

#[test]
fn generated_text_passes_validation() {
    for i in 0..30 {
        let id = format!("check-{}", i);
        let a = answers(STATES[i % 3], PACES[i % 2]);
        let (valid, reason) = validate_rationale(&generate_rationale(&id, &a));
        assert!(valid, "invalid rationale: {:?}", reason);
    }
}

#[test]
fn when_to_watch_is_deterministic_and_keyed_by_pace() {
    let slow = generate_when_to_watch("sel-7", &answers(UserState::Escape, Pace::Slow));
    let again = generate_when_to_watch("sel-7", &answers(UserState::Escape, Pace::Slow));
    assert_eq!(slow, again);
    assert!(!slow.is_empty());
}

#[test]
fn delta_explainer_substitutes_pace_word() {
    let text = generate_delta_explainer(DeltaKind::PaceFlipped, "fast", "delta");
    assert!(text.contains("faster"));
    assert!(!text.contains("{new_pace}"));

    let text = generate_delta_explainer(DeltaKind::PaceFlipped, "slow", "delta");
    assert!(text.contains("slower"));
}

#[test]
fn delta_explainer_substitutes_format_word() {
    let text = generate_delta_explainer(DeltaKind::FormatFlipped, "series", "delta");
    assert!(text.contains("series"));
    assert!(!text.contains("{new_format}"));
}

#[test]
fn tone_shift_explainer_is_generic() {
    let text = generate_delta_explainer(DeltaKind::ToneShifted, "", "delta");
    assert!(!text.is_empty());
    assert_eq!(text, generate_delta_explainer(DeltaKind::ToneShifted, "", "delta"));
}

#[test]
fn sanitize_replaces_spoilers_case_insensitively() {
    let cleaned = sanitize_text("The TWIST at the end is great", 320);
    assert!(!contains_spoiler(&cleaned));
    assert!(cleaned.contains("..."));
}

#[test]
fn sanitize_truncates_long_text() {
    let long = "a".repeat(400);
    let cleaned = sanitize_text(&long, MAX_RATIONALE_LENGTH);
    assert_eq!(cleaned.chars().count(), MAX_RATIONALE_LENGTH);
    assert!(cleaned.ends_with("..."));
}

#[test]
fn validate_rejects_oversized_text() {
    let long = "a".repeat(MAX_RATIONALE_LENGTH + 1);
    let (valid, reason) = validate_rationale(&long);
    assert!(!valid);
    assert!(reason.unwrap().contains("too long"));
}

#[test]
fn validate_rejects_spoilers() {
    let (valid, reason) = validate_rationale("the killer is the butler");
    assert!(!valid);
    assert!(reason.unwrap().contains("spoiler"));
}

#[test]
fn validate_accepts_clean_text() {
    let (valid, reason) = validate_rationale("A cozy pick for a calm evening.");
    assert!(valid);
    assert!(reason.is_none());
}
