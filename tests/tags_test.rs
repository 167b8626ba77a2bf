use serde_json::json;

use moodpick::tags::{
    context_key, match_score, normalize_intensity, normalize_mood, normalize_pace, normalize_tone,
    parse_tags, tone_bucket, ItemTags, Mood,
};
use moodpick::{Answers, Format, Pace, UserState};

fn answers(state: UserState, pace: Pace) -> Answers {
    Answers::new(state, pace, Format::Movie)
}

#[test]
fn parse_tags_accepts_valid_json() {
    let tags = parse_tags(Some(
        r#"{"pace": "slow", "mood": ["light"], "tone": ["cozy"], "intensity": 2}"#,
    ))
    .unwrap();

    assert_eq!(tags.pace, Some(Pace::Slow));
    assert_eq!(tags.moods, vec![Mood::Light]);
    assert_eq!(tags.tones, vec!["cozy".to_string()]);
    assert_eq!(tags.intensity, Some(2));
}

#[test]
fn parse_tags_rejects_malformed_input() {
    assert!(parse_tags(None).is_none());
    assert!(parse_tags(Some("")).is_none());
    assert!(parse_tags(Some("not json")).is_none());
    assert!(parse_tags(Some("[1, 2, 3]")).is_none());
    assert!(parse_tags(Some("42")).is_none());
}

#[test]
fn parse_tags_degrades_bad_fields_to_absent() {
    let tags = parse_tags(Some(r#"{"pace": 7, "mood": 3, "intensity": "x"}"#)).unwrap();
    assert_eq!(tags.pace, None);
    assert!(tags.moods.is_empty());
    assert!(tags.tones.is_empty());
    assert_eq!(tags.intensity, None);
}

#[test]
fn normalize_pace_maps_synonyms() {
    assert_eq!(normalize_pace(&json!("meditative")), Some(Pace::Slow));
    assert_eq!(normalize_pace(&json!("contemplative")), Some(Pace::Slow));
    assert_eq!(normalize_pace(&json!("dynamic")), Some(Pace::Fast));
    assert_eq!(normalize_pace(&json!("QUICK")), Some(Pace::Fast));
    assert_eq!(normalize_pace(&json!("moderate")), Some(Pace::Slow));
    assert_eq!(normalize_pace(&json!("sideways")), None);
    assert_eq!(normalize_pace(&json!(3)), None);
}

#[test]
fn normalize_mood_accepts_string_or_list_and_dedupes() {
    assert_eq!(normalize_mood(&json!("uplifting")), vec![Mood::Light]);
    assert_eq!(
        normalize_mood(&json!(["dark", "fantasy"])),
        vec![Mood::Heavy, Mood::Escape]
    );
    assert_eq!(normalize_mood(&json!(["cozy", "warm"])), vec![Mood::Light]);
    assert!(normalize_mood(&json!(42)).is_empty());
    assert!(normalize_mood(&json!(["unknown"])).is_empty());
}

#[test]
fn normalize_tone_lowercases_and_flattens() {
    assert_eq!(normalize_tone(&json!("Cozy")), vec!["cozy".to_string()]);
    assert_eq!(
        normalize_tone(&json!(["Dark", " Tense "])),
        vec!["dark".to_string(), "tense".to_string()]
    );
    assert!(normalize_tone(&json!(7)).is_empty());
}

#[test]
fn normalize_intensity_clamps_and_parses() {
    assert_eq!(normalize_intensity(&json!(3)), Some(3));
    assert_eq!(normalize_intensity(&json!(9)), Some(5));
    assert_eq!(normalize_intensity(&json!(0)), Some(1));
    assert_eq!(normalize_intensity(&json!("4")), Some(4));
    assert_eq!(normalize_intensity(&json!("loud")), None);
    assert_eq!(normalize_intensity(&json!([3])), None);
}

#[test]
fn match_score_rewards_pace_match() {
    let tags = parse_tags(Some(r#"{"pace": "slow"}"#));
    let score = match_score(tags.as_ref(), &answers(UserState::Escape, Pace::Slow), false);
    assert!((score - 2.0).abs() < 1e-6);

    let score = match_score(tags.as_ref(), &answers(UserState::Escape, Pace::Fast), false);
    assert!(score.abs() < 1e-6);
}

#[test]
fn match_score_rewards_mood_match() {
    let tags = parse_tags(Some(r#"{"mood": ["heavy"]}"#));
    let score = match_score(tags.as_ref(), &answers(UserState::Heavy, Pace::Fast), false);
    assert!((score - 2.0).abs() < 1e-6);
}

#[test]
fn match_score_rewards_tone_and_intensity() {
    let tags = parse_tags(Some(r#"{"tone": ["cozy"], "intensity": 1}"#));
    let score = match_score(tags.as_ref(), &answers(UserState::Light, Pace::Fast), false);
    assert!((score - 0.8).abs() < 1e-6);
}

#[test]
fn match_score_full_match_reaches_maximum() {
    let tags = parse_tags(Some(
        r#"{"pace": "fast", "mood": ["escape"], "tone": ["epic"], "intensity": 3}"#,
    ));
    let score = match_score(tags.as_ref(), &answers(UserState::Escape, Pace::Fast), false);
    assert!((score - 4.8).abs() < 1e-6);
}

#[test]
fn match_score_missing_tags_depends_on_require_flag() {
    let relaxed = match_score(None, &answers(UserState::Light, Pace::Slow), false);
    assert!(relaxed.abs() < 1e-6);

    let strict = match_score(None, &answers(UserState::Light, Pace::Slow), true);
    assert!(strict == f64::NEG_INFINITY);
}

#[test]
fn match_score_absent_pace_contributes_nothing() {
    let tags = parse_tags(Some(r#"{"mood": ["light"]}"#));
    let score = match_score(tags.as_ref(), &answers(UserState::Light, Pace::Slow), true);
    assert!((score - 2.0).abs() < 1e-6);
}

#[test]
fn intensity_bands_follow_state() {
    let tags = parse_tags(Some(r#"{"intensity": 5}"#));
    let heavy = match_score(tags.as_ref(), &answers(UserState::Heavy, Pace::Slow), false);
    assert!((heavy - 0.3).abs() < 1e-6);

    let light = match_score(tags.as_ref(), &answers(UserState::Light, Pace::Slow), false);
    assert!(light.abs() < 1e-6);

    let escape = match_score(tags.as_ref(), &answers(UserState::Escape, Pace::Slow), false);
    assert!(escape.abs() < 1e-6);
}

#[test]
fn context_key_formats_triple() {
    let key = context_key(&Answers::new(UserState::Light, Pace::Fast, Format::Series));
    assert_eq!(key, "state:light|pace:fast|format:series");
}

#[test]
fn context_key_defaults_to_escape_slow_movie() {
    assert_eq!(
        context_key(&Answers::default()),
        "state:escape|pace:slow|format:movie"
    );
}

#[test]
fn context_key_ignores_hint() {
    let with_hint =
        Answers::new(UserState::Heavy, Pace::Slow, Format::Movie).with_hint("something dark");
    let without = Answers::new(UserState::Heavy, Pace::Slow, Format::Movie);
    assert_eq!(context_key(&with_hint), context_key(&without));
}

#[test]
fn tone_bucket_checks_sets_in_priority_order() {
    let cozy = ItemTags {
        tones: vec!["dark".to_string(), "cozy".to_string()],
        ..ItemTags::default()
    };
    assert_eq!(tone_bucket(Some(&cozy)), "cozy/warm");

    let dark = ItemTags {
        tones: vec!["noir".to_string()],
        ..ItemTags::default()
    };
    assert_eq!(tone_bucket(Some(&dark)), "dark/tense");

    let adventure = ItemTags {
        tones: vec!["epic".to_string()],
        ..ItemTags::default()
    };
    assert_eq!(tone_bucket(Some(&adventure)), "adventure");

    let other = ItemTags {
        tones: vec!["quirky".to_string()],
        ..ItemTags::default()
    };
    assert_eq!(tone_bucket(Some(&other)), "varied");
    assert_eq!(tone_bucket(None), "varied");
}
