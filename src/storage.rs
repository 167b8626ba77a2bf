use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Format, Mode, Pace, UserState};

/// Storage-transport failure. The only error class that propagates out of
/// the engine; everything else degrades locally.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Curated,
    External,
}

impl Default for ItemSource {
    fn default() -> Self {
        ItemSource::Curated
    }
}

/// A catalog item as the engine sees it. `tags_json` stays raw here and is
/// normalized through `tags::parse_tags` at scoring time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub title: String,
    #[serde(default)]
    pub item_type: Format,
    #[serde(default)]
    pub tags_json: Option<String>,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub source: ItemSource,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub credits: Option<String>,
}

/// What changed between a prior "another" selection and this one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaInfo {
    #[serde(default)]
    pub pace_flipped: bool,
    #[serde(default)]
    pub tone_shifted: bool,
}

impl DeltaInfo {
    pub fn is_empty(&self) -> bool {
        !self.pace_flipped && !self.tone_shifted
    }
}

/// Context snapshot frozen into a selection record at creation time.
/// Weight updates recompute the context key from this snapshot, never
/// from caller-supplied answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionContext {
    #[serde(default)]
    pub state: UserState,
    #[serde(default)]
    pub pace: Pace,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub epsilon_used: f64,
    #[serde(default)]
    pub candidate_count: usize,
    #[serde(default)]
    pub selected_score: f64,
    #[serde(default)]
    pub tone_bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "DeltaInfo::is_empty")]
    pub delta: DeltaInfo,
}

/// Append-only record of one recommendation; feedback references it by id
/// but never rewrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub selection_id: String,
    pub user_id: String,
    pub item_id: String,
    pub context: SelectionContext,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub item_type: Option<Format>,
    pub source_preference: Option<ItemSource>,
    pub exclude_ids: Option<HashSet<String>>,
    pub limit: usize,
    /// Fetch a wider slice and sample it down, so repeated calls do not
    /// always surface the same top-scored rows.
    pub randomize: bool,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<Item>, StoreError>;

    async fn get_item(&self, item_id: &str) -> Result<Option<Item>, StoreError>;
}

#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn create_selection(
        &self,
        user_id: &str,
        item_id: &str,
        context: &SelectionContext,
    ) -> Result<String, StoreError>;

    async fn get_selection(&self, selection_id: &str)
        -> Result<Option<SelectionRecord>, StoreError>;

    async fn list_recent_item_ids(
        &self,
        user_id: &str,
        window_days: u32,
    ) -> Result<HashSet<String>, StoreError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn list_favorite_item_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError>;

    async fn list_dismissed_item_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError>;
}

#[async_trait]
pub trait WeightStore: Send + Sync {
    async fn get_weight(&self, user_id: &str, key: &str) -> Result<i64, StoreError>;

    async fn get_all_weights(&self, user_id: &str) -> Result<HashMap<String, i64>, StoreError>;

    /// Additive upsert: create at `delta` if absent, else add. Must not
    /// read-then-overwrite, so concurrent updates commute.
    async fn add_weight_delta(&self, user_id: &str, key: &str, delta: i64)
        -> Result<(), StoreError>;

    async fn reset_all_weights(&self, user_id: &str) -> Result<(), StoreError>;
}
