use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::{stable_hash64, Answers, Format, Pace, UserState};

pub const MAX_RATIONALE_LENGTH: usize = 320;
pub const MAX_HINT_RATIONALE_LENGTH: usize = 150;

pub const SPOILER_KEYWORDS: [&str; 13] = [
    "plot twist",
    "surprise ending",
    "twist",
    "ending",
    "killer",
    "dies",
    "murderer",
    "finale",
    "death",
    "killed",
    "betrayal",
    "reveal",
    "shocking",
];

const LIGHT_RATIONALES: [&str; 5] = [
    "Light viewing that asks nothing of you. Exactly the thing after a long day.",
    "Simple and pleasant. Settle in and enjoy.",
    "Something bright to lift the mood. No tension, no homework.",
    "A warm, easygoing story that goes down easy.",
    "Comfort viewing. Let yourself have something plain and lovely.",
];

const HEAVY_RATIONALES: [&str; 5] = [
    "A deep story that stays with you long after.",
    "Serious cinema for when you are ready to feel something real.",
    "A powerful narrative that rewards your attention.",
    "Layered storytelling that invites you to think.",
    "Substantial viewing that leaves a mark. Worth your full focus.",
];

const ESCAPE_RATIONALES: [&str; 5] = [
    "Pure escapism. Let yourself get lost in another world.",
    "A trip far away from the everyday, just as requested. Dive in.",
    "A gripping story that carries you somewhere else entirely.",
    "Full immersion in another reality. Forget about everything for a while.",
    "Adventure awaits. Step through the screen and leave your world behind.",
];

const SLOW_MODIFIERS: [&str; 3] = [
    "It takes its time, and that is the point.",
    "An unhurried rhythm that lets moments breathe.",
    "A contemplative pace for a thoughtful watch.",
];

const FAST_MODIFIERS: [&str; 3] = [
    "A lively tempo that keeps you hooked.",
    "Momentum that never lets up.",
    "Energetic from the first minute to the last.",
];

const WHEN_LIGHT_SLOW: [&str; 3] = [
    "Best with no distractions and a warm drink.",
    "Perfect for a quiet evening when you want to unwind.",
    "For winding down at the end of the day.",
];

const WHEN_LIGHT_FAST: [&str; 3] = [
    "For when you want light entertainment with some energy.",
    "Weekend viewing when you want fun without tension.",
    "When you want something easy but lively.",
];

const WHEN_HEAVY_SLOW: [&str; 3] = [
    "Set aside time with no distractions. It rewards patience.",
    "For a late evening when you can give it your full attention.",
    "When you are ready to really sink into a story.",
];

const WHEN_HEAVY_FAST: [&str; 3] = [
    "For when you want intensity without the slow burn.",
    "A gripping watch that demands attention.",
    "When you want something serious but propulsive.",
];

const WHEN_ESCAPE_SLOW: [&str; 3] = [
    "Get comfortable for the journey and let the world build around you.",
    "For a lazy day when you want to disappear somewhere.",
    "When you have time to fully immerse yourself.",
];

const WHEN_ESCAPE_FAST: [&str; 3] = [
    "Buckle up; it moves and does not let go.",
    "For when you want adventure from the opening minute.",
    "For a thrilling break from reality.",
];

const PACE_FLIPPED_EXPLAINERS: [&str; 3] = [
    "Same mood, but {new_pace} this time.",
    "Here is something {new_pace}.",
    "The same atmosphere at a different rhythm: {new_pace}.",
];

const TONE_SHIFTED_EXPLAINERS: [&str; 3] = [
    "A similar feeling with a different shade.",
    "Staying in the mood, shifting the accent.",
    "Same essence, new angle.",
];

const FORMAT_FLIPPED_EXPLAINERS: [&str; 3] = [
    "A {new_format} this time.",
    "Same vibe, now as a {new_format}.",
    "Switching the format: {new_format}.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    PaceFlipped,
    ToneShifted,
    FormatFlipped,
}

fn hash_seed(selection_id: &str, salt: &str) -> u64 {
    stable_hash64(&format!("{}{}", selection_id, salt))
}

fn select_by_hash<'a>(options: &[&'a str], selection_id: &str, salt: &str) -> &'a str {
    if options.is_empty() {
        return "";
    }
    let idx = (hash_seed(selection_id, salt) % options.len() as u64) as usize;
    options[idx]
}

fn spoiler_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SPOILER_KEYWORDS
            .iter()
            .map(|kw| {
                RegexBuilder::new(&regex::escape(kw))
                    .case_insensitive(true)
                    .build()
                    .expect("spoiler keyword compiles to a literal pattern")
            })
            .collect()
    })
}

pub fn contains_spoiler(text: &str) -> bool {
    let lower = text.to_lowercase();
    SPOILER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn truncate_chars(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Strip spoiler keywords (case-insensitive) and enforce the length cap.
pub fn sanitize_text(text: &str, max_length: usize) -> String {
    let mut result = text.to_string();
    for pattern in spoiler_patterns() {
        result = pattern.replace_all(&result, "...").into_owned();
    }
    truncate_chars(&result, max_length)
}

fn rationale_templates(state: UserState) -> &'static [&'static str] {
    match state {
        UserState::Light => &LIGHT_RATIONALES,
        UserState::Heavy => &HEAVY_RATIONALES,
        UserState::Escape => &ESCAPE_RATIONALES,
    }
}

fn pace_modifiers(pace: Pace) -> &'static [&'static str] {
    match pace {
        Pace::Slow => &SLOW_MODIFIERS,
        Pace::Fast => &FAST_MODIFIERS,
    }
}

fn when_templates(state: UserState, pace: Pace) -> &'static [&'static str] {
    match (state, pace) {
        (UserState::Light, Pace::Slow) => &WHEN_LIGHT_SLOW,
        (UserState::Light, Pace::Fast) => &WHEN_LIGHT_FAST,
        (UserState::Heavy, Pace::Slow) => &WHEN_HEAVY_SLOW,
        (UserState::Heavy, Pace::Fast) => &WHEN_HEAVY_FAST,
        (UserState::Escape, Pace::Slow) => &WHEN_ESCAPE_SLOW,
        (UserState::Escape, Pace::Fast) => &WHEN_ESCAPE_FAST,
    }
}

/// Deterministic justification text for a selection. Identical inputs
/// yield byte-identical output.
pub fn generate_rationale(selection_id: &str, answers: &Answers) -> String {
    let templates = rationale_templates(answers.state);
    let mut text = select_by_hash(templates, selection_id, "rationale").to_string();

    // A second hash draw appends a pace modifier half the time.
    if hash_seed(selection_id, "pace_mod") % 2 == 0 {
        let modifier = select_by_hash(pace_modifiers(answers.pace), selection_id, "pace");
        text = format!("{} {}", text, modifier);
    }

    sanitize_text(&text, MAX_RATIONALE_LENGTH)
}

/// Deterministic "when to watch this" suggestion keyed by (state, pace).
pub fn generate_when_to_watch(selection_id: &str, answers: &Answers) -> String {
    let templates = when_templates(answers.state, answers.pace);
    select_by_hash(templates, selection_id, "when").to_string()
}

fn pace_word(pace: Pace) -> &'static str {
    match pace {
        Pace::Slow => "slower",
        Pace::Fast => "faster",
    }
}

/// Short text describing what changed for a "show me another" pick.
pub fn generate_delta_explainer(kind: DeltaKind, new_value: &str, selection_id: &str) -> String {
    match kind {
        DeltaKind::PaceFlipped => {
            let template = select_by_hash(&PACE_FLIPPED_EXPLAINERS, selection_id, "delta");
            let word = Pace::from_str(new_value)
                .map(pace_word)
                .unwrap_or(new_value);
            template.replace("{new_pace}", word)
        }
        DeltaKind::ToneShifted => {
            select_by_hash(&TONE_SHIFTED_EXPLAINERS, selection_id, "delta").to_string()
        }
        DeltaKind::FormatFlipped => {
            let template = select_by_hash(&FORMAT_FLIPPED_EXPLAINERS, selection_id, "delta");
            let word = Format::from_str(new_value)
                .map(Format::label)
                .unwrap_or(new_value);
            template.replace("{new_format}", word)
        }
    }
}

/// Re-check length and spoiler-freedom, defense in depth for text that has
/// already been through `sanitize_text`.
pub fn validate_rationale(rationale: &str) -> (bool, Option<String>) {
    let length = rationale.chars().count();
    if length > MAX_RATIONALE_LENGTH {
        return (
            false,
            Some(format!(
                "rationale too long: {} > {}",
                length, MAX_RATIONALE_LENGTH
            )),
        );
    }
    if contains_spoiler(rationale) {
        return (false, Some("rationale contains spoiler keywords".to_string()));
    }
    (true, None)
}
