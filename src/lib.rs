pub mod anti_repeat;
pub mod config;
pub mod engine;
pub mod hint;
pub mod learning;
pub mod llm;
pub mod rationale;
pub mod storage;
pub mod store;
pub mod tags;

use serde::{Deserialize, Serialize};

pub use config::EngineConfig;
pub use engine::{
    epsilon_greedy_select, Engine, LastContext, RecommendationResult, ScoredCandidate,
    SelectionMeta,
};
pub use hint::{parse_hint, HintOverrides, HintResult};
pub use storage::{
    CandidateQuery, CatalogStore, DeltaInfo, Item, ItemSource, PreferenceStore, SelectionContext,
    SelectionRecord, SelectionStore, StoreError, WeightStore,
};
pub use store::JsonStore;
pub use tags::ItemTags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Light,
    Heavy,
    Escape,
}

impl Default for UserState {
    fn default() -> Self {
        UserState::Escape
    }
}

impl UserState {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "light" => Some(UserState::Light),
            "heavy" => Some(UserState::Heavy),
            "escape" => Some(UserState::Escape),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserState::Light => "light",
            UserState::Heavy => "heavy",
            UserState::Escape => "escape",
        }
    }

    /// Heavy and light oppose each other; escape has no opposite.
    pub fn opposite(self) -> Option<Self> {
        match self {
            UserState::Heavy => Some(UserState::Light),
            UserState::Light => Some(UserState::Heavy),
            UserState::Escape => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Slow,
    Fast,
}

impl Default for Pace {
    fn default() -> Self {
        Pace::Slow
    }
}

impl Pace {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "slow" => Some(Pace::Slow),
            "fast" => Some(Pace::Fast),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pace::Slow => "slow",
            Pace::Fast => "fast",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Pace::Slow => Pace::Fast,
            Pace::Fast => Pace::Slow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Movie,
    Series,
}

impl Default for Format {
    fn default() -> Self {
        Format::Movie
    }
}

impl Format {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "movie" => Some(Format::Movie),
            "series" => Some(Format::Series),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Format::Movie => "movie",
            Format::Series => "series",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Format::Movie => Format::Series,
            Format::Series => Format::Movie,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Normal,
    Another,
    MissRecover,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Normal
    }
}

impl Mode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "normal" => Some(Mode::Normal),
            "another" => Some(Mode::Another),
            "miss_recover" => Some(Mode::MissRecover),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Another => "another",
            Mode::MissRecover => "miss_recover",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Hit,
    Miss,
    Another,
    Favorite,
    Share,
    SilentDrop,
}

impl FeedbackAction {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "hit" => Some(FeedbackAction::Hit),
            "miss" => Some(FeedbackAction::Miss),
            "another" => Some(FeedbackAction::Another),
            "favorite" => Some(FeedbackAction::Favorite),
            "share" => Some(FeedbackAction::Share),
            "silent_drop" => Some(FeedbackAction::SilentDrop),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedbackAction::Hit => "hit",
            FeedbackAction::Miss => "miss",
            FeedbackAction::Another => "another",
            FeedbackAction::Favorite => "favorite",
            FeedbackAction::Share => "share",
            FeedbackAction::SilentDrop => "silent_drop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissReason {
    TooSlow,
    TooHeavy,
    NotVibe,
}

impl MissReason {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "tooslow" => Some(MissReason::TooSlow),
            "tooheavy" => Some(MissReason::TooHeavy),
            "notvibe" => Some(MissReason::NotVibe),
            _ => None,
        }
    }
}

/// A user's answer set for one recommendation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(default)]
    pub state: UserState,
    #[serde(default)]
    pub pace: Pace,
    #[serde(default)]
    pub format: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Answers {
    pub fn new(state: UserState, pace: Pace, format: Format) -> Self {
        Self {
            state,
            pace,
            format,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub(crate) fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
