use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::storage::{
    CandidateQuery, CatalogStore, Item, PreferenceStore, SelectionContext, SelectionRecord,
    SelectionStore, StoreError, WeightStore,
};

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct StoreState {
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    selections: Vec<SelectionRecord>,
    #[serde(default)]
    favorites: HashMap<String, HashSet<String>>,
    #[serde(default)]
    dismissed: HashMap<String, HashSet<String>>,
    #[serde(default)]
    weights: HashMap<String, HashMap<String, i64>>,
}

/// Single-file JSON store implementing all four storage capabilities.
/// Backs the CLI and the integration tests; production callers bring
/// their own adapters.
pub struct JsonStore {
    path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl JsonStore {
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let state = if path.exists() {
            let data = tokio::fs::read_to_string(&path).await?;
            if data.trim().is_empty() {
                StoreState::default()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            StoreState::default()
        };

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// In-memory store with no backing file; persistence is a no-op.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub async fn upsert_item(&self, item: Item) -> Result<(), StoreError> {
        let mut guard = self.state.write().await;
        upsert(&mut guard.items, item);
        self.persist(&guard).await
    }

    pub async fn seed_items(&self, items: Vec<Item>) -> Result<usize, StoreError> {
        let count = items.len();
        let mut guard = self.state.write().await;
        for item in items {
            upsert(&mut guard.items, item);
        }
        self.persist(&guard).await?;
        Ok(count)
    }

    pub async fn add_favorite(&self, user_id: &str, item_id: &str) -> Result<(), StoreError> {
        let mut guard = self.state.write().await;
        guard
            .favorites
            .entry(user_id.to_string())
            .or_default()
            .insert(item_id.to_string());
        self.persist(&guard).await
    }

    pub async fn dismiss_item(&self, user_id: &str, item_id: &str) -> Result<(), StoreError> {
        let mut guard = self.state.write().await;
        guard
            .dismissed
            .entry(user_id.to_string())
            .or_default()
            .insert(item_id.to_string());
        self.persist(&guard).await
    }

    async fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(parent) = path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(state)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

fn upsert(items: &mut Vec<Item>, item: Item) {
    if let Some(pos) = items.iter().position(|i| i.item_id == item.item_id) {
        items[pos] = item;
    } else {
        items.push(item);
    }
}

async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

#[async_trait]
impl CatalogStore for JsonStore {
    async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<Item>, StoreError> {
        let guard = self.state.read().await;

        let fetch_limit = if query.randomize {
            query.limit * 3
        } else {
            query.limit
        };

        let mut items: Vec<Item> = guard
            .items
            .iter()
            .filter(|item| query.item_type.map_or(true, |t| item.item_type == t))
            .filter(|item| {
                query
                    .source_preference
                    .map_or(true, |source| item.source == source)
            })
            .filter(|item| {
                query
                    .exclude_ids
                    .as_ref()
                    .map_or(true, |ids| !ids.contains(&item.item_id))
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            b.base_score
                .partial_cmp(&a.base_score)
                .unwrap_or(Ordering::Equal)
        });
        items.truncate(fetch_limit);

        if query.randomize && items.len() > query.limit {
            let mut rng = rand::thread_rng();
            items.shuffle(&mut rng);
            items.truncate(query.limit);
        }

        Ok(items)
    }

    async fn get_item(&self, item_id: &str) -> Result<Option<Item>, StoreError> {
        let guard = self.state.read().await;
        Ok(guard.items.iter().find(|i| i.item_id == item_id).cloned())
    }
}

#[async_trait]
impl SelectionStore for JsonStore {
    async fn create_selection(
        &self,
        user_id: &str,
        item_id: &str,
        context: &SelectionContext,
    ) -> Result<String, StoreError> {
        let selection_id = Uuid::new_v4().to_string();
        let record = SelectionRecord {
            selection_id: selection_id.clone(),
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            context: context.clone(),
            created_at: Utc::now(),
        };

        let mut guard = self.state.write().await;
        guard.selections.push(record);
        self.persist(&guard).await?;
        Ok(selection_id)
    }

    async fn get_selection(
        &self,
        selection_id: &str,
    ) -> Result<Option<SelectionRecord>, StoreError> {
        let guard = self.state.read().await;
        Ok(guard
            .selections
            .iter()
            .find(|s| s.selection_id == selection_id)
            .cloned())
    }

    async fn list_recent_item_ids(
        &self,
        user_id: &str,
        window_days: u32,
    ) -> Result<HashSet<String>, StoreError> {
        let cutoff = Utc::now() - Duration::days(i64::from(window_days));
        let guard = self.state.read().await;
        Ok(guard
            .selections
            .iter()
            .filter(|s| s.user_id == user_id && s.created_at >= cutoff)
            .map(|s| s.item_id.clone())
            .collect())
    }
}

#[async_trait]
impl PreferenceStore for JsonStore {
    async fn list_favorite_item_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let guard = self.state.read().await;
        Ok(guard.favorites.get(user_id).cloned().unwrap_or_default())
    }

    async fn list_dismissed_item_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let guard = self.state.read().await;
        Ok(guard.dismissed.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl WeightStore for JsonStore {
    async fn get_weight(&self, user_id: &str, key: &str) -> Result<i64, StoreError> {
        let guard = self.state.read().await;
        Ok(guard
            .weights
            .get(user_id)
            .and_then(|user| user.get(key))
            .copied()
            .unwrap_or(0))
    }

    async fn get_all_weights(&self, user_id: &str) -> Result<HashMap<String, i64>, StoreError> {
        let guard = self.state.read().await;
        Ok(guard.weights.get(user_id).cloned().unwrap_or_default())
    }

    async fn add_weight_delta(
        &self,
        user_id: &str,
        key: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        // Increment under the write lock so concurrent deltas commute.
        let mut guard = self.state.write().await;
        *guard
            .weights
            .entry(user_id.to_string())
            .or_default()
            .entry(key.to_string())
            .or_insert(0) += delta;
        self.persist(&guard).await
    }

    async fn reset_all_weights(&self, user_id: &str) -> Result<(), StoreError> {
        let mut guard = self.state.write().await;
        guard.weights.remove(user_id);
        self.persist(&guard).await
    }
}
