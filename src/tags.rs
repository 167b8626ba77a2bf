use serde_json::Value;

use crate::{Answers, Pace, UserState};

pub const INTENSITY_MIN: i64 = 1;
pub const INTENSITY_MAX: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Light,
    Heavy,
    Escape,
}

impl UserState {
    /// States map onto moods one-to-one.
    pub fn target_mood(self) -> Mood {
        match self {
            UserState::Light => Mood::Light,
            UserState::Heavy => Mood::Heavy,
            UserState::Escape => Mood::Escape,
        }
    }
}

/// Semantic tags for a catalog item, normalized at the storage boundary.
///
/// Items fresh out of ingestion may not be tagged yet; every field is
/// optional and scoring tolerates an entirely absent record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemTags {
    pub pace: Option<Pace>,
    pub moods: Vec<Mood>,
    pub tones: Vec<String>,
    pub intensity: Option<i64>,
}

/// Parse a raw tags JSON blob into a normalized record.
///
/// Returns `None` for missing, empty, malformed, or non-object input;
/// individual fields that fail normalization degrade to absent/empty.
pub fn parse_tags(tags_json: Option<&str>) -> Option<ItemTags> {
    let raw = tags_json?.trim();
    if raw.is_empty() {
        return None;
    }

    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    Some(ItemTags {
        pace: object.get("pace").and_then(normalize_pace),
        moods: object.get("mood").map(normalize_mood).unwrap_or_default(),
        tones: object.get("tone").map(normalize_tone).unwrap_or_default(),
        intensity: object.get("intensity").and_then(normalize_intensity),
    })
}

pub fn normalize_pace(raw: &Value) -> Option<Pace> {
    let text = raw.as_str()?.trim().to_lowercase();
    match text.as_str() {
        "slow" | "meditative" | "contemplative" | "leisurely" => Some(Pace::Slow),
        "fast" | "quick" | "rapid" | "dynamic" | "intense" => Some(Pace::Fast),
        // Middling pace matches slow viewers better than fast ones.
        "medium" | "moderate" | "balanced" => Some(Pace::Slow),
        _ => None,
    }
}

pub fn normalize_mood(raw: &Value) -> Vec<Mood> {
    let entries: Vec<&str> = match raw {
        Value::String(s) => vec![s.as_str()],
        Value::Array(list) => list.iter().filter_map(Value::as_str).collect(),
        _ => return Vec::new(),
    };

    let mut moods = Vec::new();
    for entry in entries {
        let mood = match entry.trim().to_lowercase().as_str() {
            "light" | "uplifting" | "fun" | "cheerful" | "cozy" | "warm" | "hopeful" => {
                Some(Mood::Light)
            }
            "heavy" | "dark" | "intense" | "dramatic" | "serious" | "deep" | "profound" => {
                Some(Mood::Heavy)
            }
            "escape" | "escapist" | "immersive" | "adventure" | "fantasy" | "otherworldly" => {
                Some(Mood::Escape)
            }
            _ => None,
        };
        if let Some(mood) = mood {
            if !moods.contains(&mood) {
                moods.push(mood);
            }
        }
    }
    moods
}

pub fn normalize_tone(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(s) => vec![s.trim().to_lowercase()],
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_str)
            .map(|t| t.trim().to_lowercase())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_intensity(raw: &Value) -> Option<i64> {
    let value = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(value.clamp(INTENSITY_MIN, INTENSITY_MAX))
}

const LIGHT_TONES: [&str; 6] = ["cozy", "warm", "heartfelt", "funny", "romantic", "sweet"];
const HEAVY_TONES: [&str; 5] = ["dark", "tense", "thought-provoking", "emotional", "profound"];
const ESCAPE_TONES: [&str; 5] = ["adventure", "mysterious", "fantastical", "thrilling", "epic"];

fn preferred_tones(state: UserState) -> &'static [&'static str] {
    match state {
        UserState::Light => &LIGHT_TONES,
        UserState::Heavy => &HEAVY_TONES,
        UserState::Escape => &ESCAPE_TONES,
    }
}

fn intensity_fits(state: UserState, intensity: i64) -> bool {
    match state {
        UserState::Light => intensity <= 2,
        UserState::Heavy => intensity >= 4,
        UserState::Escape => (2..=4).contains(&intensity),
    }
}

/// Score how well an item's tags match a user's answers.
///
/// +2.0 for a pace match, +2.0 for a mood match, +0.5 for preferred-tone
/// overlap, +0.3 for an intensity fit. Untagged items score 0.0, or
/// negative infinity when `require_tags` filters them out entirely.
pub fn match_score(item_tags: Option<&ItemTags>, answers: &Answers, require_tags: bool) -> f64 {
    let tags = match item_tags {
        Some(tags) => tags,
        None => {
            return if require_tags { f64::NEG_INFINITY } else { 0.0 };
        }
    };

    let mut score = 0.0;

    if tags.pace == Some(answers.pace) {
        score += 2.0;
    }

    if tags.moods.contains(&answers.state.target_mood()) {
        score += 2.0;
    }

    let preferred = preferred_tones(answers.state);
    if tags.tones.iter().any(|t| preferred.contains(&t.as_str())) {
        score += 0.5;
    }

    if let Some(intensity) = tags.intensity {
        if intensity_fits(answers.state, intensity) {
            score += 0.3;
        }
    }

    score
}

/// Canonical key identifying a (state, pace, format) triple for weight
/// accounting. Two answer sets with the same triple share a bucket
/// regardless of hint.
pub fn context_key(answers: &Answers) -> String {
    format!(
        "state:{}|pace:{}|format:{}",
        answers.state.label(),
        answers.pace.label(),
        answers.format.label()
    )
}

const COZY_BUCKET: [&str; 5] = ["cozy", "warm", "heartfelt", "romantic", "sweet"];
const DARK_BUCKET: [&str; 5] = ["dark", "tense", "thriller", "noir", "moody"];
const ADVENTURE_BUCKET: [&str; 4] = ["adventure", "action", "thrilling", "epic"];

/// Coarse tone label used only for delta messaging, never for scoring.
pub fn tone_bucket(tags: Option<&ItemTags>) -> &'static str {
    let tags = match tags {
        Some(tags) => tags,
        None => return "varied",
    };

    let has = |bucket: &[&str]| tags.tones.iter().any(|t| bucket.contains(&t.as_str()));

    if has(&COZY_BUCKET) {
        "cozy/warm"
    } else if has(&DARK_BUCKET) {
        "dark/tense"
    } else if has(&ADVENTURE_BUCKET) {
        "adventure"
    } else {
        "varied"
    }
}
