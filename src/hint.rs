use std::collections::HashSet;

use crate::tags::ItemTags;
use crate::{Format, Pace, UserState};

pub const HINT_SCORE_CAP: f64 = 8.0;
const MIN_SEARCH_WORD_LEN: usize = 3;

/// Answer-field overrides extracted from a free-text hint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HintOverrides {
    pub state: Option<UserState>,
    pub pace: Option<Pace>,
    pub format: Option<Format>,
}

impl HintOverrides {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.pace.is_none() && self.format.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HintResult {
    pub overrides: HintOverrides,
    pub tone_keywords: HashSet<String>,
    pub search_words: Vec<String>,
    /// Keywords produced by the optional LLM translation pass. Empty until
    /// the caller fills them in; unlocks overview/genre/credits matching.
    pub llm_keywords: Vec<String>,
}

impl HintResult {
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
            && self.tone_keywords.is_empty()
            && self.search_words.is_empty()
            && self.llm_keywords.is_empty()
    }
}

struct GenreRule {
    keywords: &'static [&'static str],
    state: Option<UserState>,
    pace: Option<Pace>,
    tones: &'static [&'static str],
}

// Every matching rule contributes; overrides and tones union across rows.
const GENRE_RULES: &[GenreRule] = &[
    GenreRule {
        keywords: &["detective", "crime", "mystery", "whodunit", "noir", "investigation"],
        state: Some(UserState::Heavy),
        pace: Some(Pace::Slow),
        tones: &["dark", "mysterious", "tense"],
    },
    GenreRule {
        keywords: &["action", "shootout", "explosive", "fight"],
        state: Some(UserState::Escape),
        pace: Some(Pace::Fast),
        tones: &["adventure", "thrilling"],
    },
    GenreRule {
        keywords: &["comedy", "funny", "hilarious", "laugh", "lighthearted"],
        state: Some(UserState::Light),
        pace: Some(Pace::Fast),
        tones: &["funny", "warm"],
    },
    GenreRule {
        keywords: &["drama", "dramatic", "tearjerker"],
        state: Some(UserState::Heavy),
        pace: Some(Pace::Slow),
        tones: &["melancholy", "emotional"],
    },
    GenreRule {
        keywords: &["horror", "scary", "creepy", "thriller", "chilling"],
        state: Some(UserState::Heavy),
        pace: Some(Pace::Fast),
        tones: &["dark", "tense"],
    },
    GenreRule {
        keywords: &["romance", "romantic", "love"],
        state: Some(UserState::Light),
        pace: Some(Pace::Slow),
        tones: &["warm", "romantic"],
    },
    GenreRule {
        keywords: &["fantasy", "sci-fi", "scifi", "space", "magic", "science fiction"],
        state: Some(UserState::Escape),
        pace: None,
        tones: &["weird", "adventure"],
    },
    GenreRule {
        keywords: &["animation", "animated", "cartoon", "anime"],
        state: Some(UserState::Light),
        pace: None,
        tones: &["cozy", "warm"],
    },
    // Regional cues carry no structural override; the words still count
    // as search words for title matching.
    GenreRule {
        keywords: &["korean", "k-drama", "kdrama"],
        state: None,
        pace: None,
        tones: &[],
    },
    GenreRule {
        keywords: &["documentary", "docu", "docuseries"],
        state: Some(UserState::Heavy),
        pace: Some(Pace::Slow),
        tones: &["thought-provoking"],
    },
    GenreRule {
        keywords: &["calm", "quiet", "contemplative", "unhurried"],
        state: None,
        pace: Some(Pace::Slow),
        tones: &[],
    },
    GenreRule {
        keywords: &["dynamic", "adrenaline", "pacey", "breakneck"],
        state: None,
        pace: Some(Pace::Fast),
        tones: &[],
    },
];

const SERIES_WORDS: [&str; 4] = ["series", "show", "season", "episodes"];
const MOVIE_WORDS: [&str; 3] = ["movie", "film", "flick"];

const STOP_WORDS: [&str; 26] = [
    "something", "like", "similar", "good", "cool", "nice", "great", "want", "watch", "please",
    "maybe", "about", "with", "that", "this", "the", "and", "for", "some", "any", "really",
    "movie", "series", "film", "show", "tonight",
];

/// Parse a free-text hint into structural overrides, tone keywords, and
/// search words. Never fails; blank input yields an empty result.
pub fn parse_hint(hint: Option<&str>) -> HintResult {
    let text = match hint {
        Some(text) if !text.trim().is_empty() => text.trim().to_lowercase(),
        _ => return HintResult::default(),
    };
    let words: Vec<&str> = text.split_whitespace().collect();

    let mut result = HintResult::default();

    // An explicit format word beats the answer-set format.
    if words.iter().any(|w| SERIES_WORDS.contains(w)) {
        result.overrides.format = Some(Format::Series);
    } else if words.iter().any(|w| MOVIE_WORDS.contains(w)) {
        result.overrides.format = Some(Format::Movie);
    }

    for rule in GENRE_RULES {
        let token_hit = words.iter().any(|w| rule.keywords.contains(w));
        let phrase_hit = rule
            .keywords
            .iter()
            .any(|kw| kw.contains(' ') && text.contains(kw));
        if token_hit || phrase_hit {
            if rule.state.is_some() {
                result.overrides.state = rule.state;
            }
            if rule.pace.is_some() {
                result.overrides.pace = rule.pace;
            }
            for tone in rule.tones {
                result.tone_keywords.insert((*tone).to_string());
            }
        }
    }

    result.search_words = words
        .iter()
        .copied()
        .filter(|w| w.chars().count() >= MIN_SEARCH_WORD_LEN && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect();

    result
}

/// Bonus score for hint relevance, capped at 8.0.
///
/// Title and tone matching always apply; overview, genre, and credits
/// matching need LLM-derived keywords and degrade gracefully without them.
pub fn hint_match_score(
    item_title: &str,
    item_tags: Option<&ItemTags>,
    hint: &HintResult,
    overview: Option<&str>,
    genres_text: Option<&str>,
    credits_text: Option<&str>,
) -> f64 {
    if hint.search_words.is_empty() && hint.llm_keywords.is_empty() && hint.tone_keywords.is_empty()
    {
        return 0.0;
    }

    let mut score: f64 = 0.0;
    let title_lower = item_title.to_lowercase();

    for word in hint.search_words.iter().chain(hint.llm_keywords.iter()) {
        if title_lower.contains(word.as_str()) {
            score += 3.0;
        }
    }

    if let Some(tags) = item_tags {
        for tone in &hint.tone_keywords {
            if tags.tones.contains(tone) {
                score += 1.5;
            }
        }
    }

    if hint.llm_keywords.is_empty() {
        return score.min(HINT_SCORE_CAP);
    }

    if let Some(overview) = overview {
        let overview_lower = overview.to_lowercase();
        for word in &hint.llm_keywords {
            if overview_lower.contains(word.as_str()) {
                score += 1.0;
            }
        }
    }

    if let Some(genres) = genres_text {
        let genres_lower = genres.to_lowercase();
        for word in &hint.llm_keywords {
            if genres_lower.contains(word.as_str()) {
                score += 2.0;
            }
        }
    }

    if let Some(credits) = credits_text {
        let credits_lower = credits.to_lowercase();
        for word in &hint.llm_keywords {
            if credits_lower.contains(word.as_str()) {
                score += 3.0;
            }
        }
    }

    score.min(HINT_SCORE_CAP)
}
