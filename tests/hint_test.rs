use moodpick::hint::{hint_match_score, parse_hint, HintResult, HINT_SCORE_CAP};
use moodpick::tags::ItemTags;
use moodpick::{Format, Pace, UserState};

#[test]
fn blank_hints_yield_empty_results() {
    assert!(parse_hint(None).is_empty());
    assert!(parse_hint(Some("")).is_empty());
    assert!(parse_hint(Some("   ")).is_empty());
}

#[test]
fn genre_keywords_set_overrides_and_tones() {
    let result = parse_hint(Some("a gritty detective story"));

    assert_eq!(result.overrides.state, Some(UserState::Heavy));
    assert_eq!(result.overrides.pace, Some(Pace::Slow));
    assert!(result.tone_keywords.contains("dark"));
    assert!(result.tone_keywords.contains("mysterious"));
    assert!(result.tone_keywords.contains("tense"));
}

#[test]
fn every_matching_genre_row_contributes() {
    let result = parse_hint(Some("funny detective"));

    // Tones union across both rows; the later row wins per override field.
    assert!(result.tone_keywords.contains("dark"));
    assert!(result.tone_keywords.contains("funny"));
    assert!(result.tone_keywords.contains("warm"));
    assert_eq!(result.overrides.state, Some(UserState::Light));
    assert_eq!(result.overrides.pace, Some(Pace::Fast));
}

#[test]
fn explicit_format_words_override() {
    assert_eq!(
        parse_hint(Some("a crime series")).overrides.format,
        Some(Format::Series)
    );
    assert_eq!(
        parse_hint(Some("some movie tonight")).overrides.format,
        Some(Format::Movie)
    );
    assert_eq!(parse_hint(Some("space opera")).overrides.format, None);
}

#[test]
fn search_words_skip_short_and_stop_words()  {
    let result = parse_hint(Some("something like blade runner on tv"));

    assert!(result.search_words.contains(&"blade".to_string()));
    assert!(result.search_words.contains(&"runner".to_string()));
    assert!(!result.search_words.contains(&"something".to_string()));
    assert!(!result.search_words.contains(&"like".to_string()));
    assert!(!result.search_words.contains(&"on".to_string()));
    assert!(!result.search_words.contains(&"tv".to_string()));
}

#[test]
fn phrase_keywords_match_inside_text() {
    let result = parse_hint(Some("some science fiction tonight"));
    assert_eq!(result.overrides.state, Some(UserState::Escape));
}

fn hint_with_words(words: &[&str]) -> HintResult {
    HintResult {
        search_words: words.iter().map(|w| w.to_string()).collect(),
        ..HintResult::default()
    }
}

#[test]
fn title_matches_score_three_per_word() {
    let hint = hint_with_words(&["blade", "runner"]);
    let score = hint_match_score("Blade Runner", None, &hint, None, None, None);
    assert!((score - 6.0).abs() < 1e-6);
}

#[test]
fn tone_keywords_score_against_item_tones() {
    let mut hint = HintResult::default();
    hint.tone_keywords.insert("dark".to_string());
    hint.tone_keywords.insert("tense".to_string());

    let tags = ItemTags {
        tones: vec!["dark".to_string()],
        ..ItemTags::default()
    };
    let score = hint_match_score("Unrelated", Some(&tags), &hint, None, None, None);
    assert!((score - 1.5).abs() < 1e-6);
}

#[test]
fn empty_hint_scores_zero() {
    let score = hint_match_score("Anything", None, &HintResult::default(), None, None, None);
    assert!(score.abs() < 1e-6);
}

#[test]
fn overview_and_genre_matching_needs_llm_keywords() {
    let hint = hint_with_words(&["heist"]);
    let score = hint_match_score(
        "Some Title",
        None,
        &hint,
        Some("a daring heist in broad daylight"),
        Some("crime, heist"),
        None,
    );
    // Search words alone never unlock overview/genre matching.
    assert!(score.abs() < 1e-6);

    let mut hint = hint_with_words(&[]);
    hint.llm_keywords = vec!["heist".to_string()];
    let score = hint_match_score(
        "Some Title",
        None,
        &hint,
        Some("a daring heist in broad daylight"),
        Some("crime, heist"),
        Some("director: jane doe"),
    );
    assert!((score - 3.0).abs() < 1e-6);
}

#[test]
fn credits_matching_scores_highest_per_word() {
    let mut hint = HintResult::default();
    hint.llm_keywords = vec!["tarkovsky".to_string()];
    let score = hint_match_score(
        "Stalker",
        None,
        &hint,
        None,
        None,
        Some("director: andrei tarkovsky"),
    );
    assert!((score - 3.0).abs() < 1e-6);
}

#[test]
fn hint_score_caps_at_eight() {
    let hint = hint_with_words(&["the", "big", "lebowski", "dude", "bowling"]);
    let score = hint_match_score(
        "the big lebowski dude bowling",
        None,
        &hint,
        None,
        None,
        None,
    );
    assert!((score - HINT_SCORE_CAP).abs() < 1e-6);
}
