use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::anti_repeat::excluded_item_ids;
use crate::config::EngineConfig;
use crate::hint::{hint_match_score, parse_hint, HintResult};
use crate::learning::{self, weight_bonus};
use crate::llm::LlmClient;
use crate::rationale::{
    generate_delta_explainer, generate_rationale, generate_when_to_watch, DeltaKind,
};
use crate::stable_hash64;
use crate::storage::{
    CandidateQuery, CatalogStore, DeltaInfo, Item, ItemSource, PreferenceStore, SelectionContext,
    SelectionStore, StoreError, WeightStore,
};
use crate::tags::{context_key, match_score, parse_tags, tone_bucket, ItemTags};
use crate::{Answers, Mode, Pace};

/// Prior-selection context supplied by the caller in "another" mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastContext {
    #[serde(default)]
    pub pace: Option<Pace>,
    #[serde(default)]
    pub delta: DeltaInfo,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub item: Item,
    pub tags: Option<ItemTags>,
    pub score: f64,
    pub match_score: f64,
    pub weight_bonus: f64,
    pub novelty_bonus: f64,
    pub hint_bonus: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionMeta {
    pub mode: Mode,
    pub epsilon_used: f64,
    pub candidate_count: usize,
    pub curated_count: usize,
    pub external_count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    pub selection_id: String,
    pub item_id: String,
    pub title: String,
    pub rationale: String,
    pub when_to_watch: String,
    pub poster_url: Option<String>,
    pub rating: Option<f64>,
    pub delta_explainer: Option<String>,
    pub hint_rationale: Option<String>,
    pub meta: SelectionMeta,
}

/// The decision core: scores eligible catalog items against a user's
/// answers and learned weights, picks one with epsilon-greedy
/// exploration, and records the selection.
pub struct Engine {
    catalog: Arc<dyn CatalogStore>,
    selections: Arc<dyn SelectionStore>,
    prefs: Arc<dyn PreferenceStore>,
    weights: Arc<dyn WeightStore>,
    config: EngineConfig,
    llm: Option<LlmClient>,
}

impl Engine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        selections: Arc<dyn SelectionStore>,
        prefs: Arc<dyn PreferenceStore>,
        weights: Arc<dyn WeightStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            selections,
            prefs,
            weights,
            config,
            llm: None,
        }
    }

    pub fn with_llm(mut self, llm: LlmClient) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Pick one item for this user, or `Ok(None)` when nothing is
    /// eligible. The only errors are storage-transport failures.
    pub async fn get_recommendation(
        &self,
        user_id: &str,
        answers: &Answers,
        mode: Mode,
        exclude_item_ids: Option<&HashSet<String>>,
        last_context: Option<&LastContext>,
    ) -> Result<Option<RecommendationResult>, StoreError> {
        let mut hint_result = parse_hint(answers.hint.as_deref());

        if let (Some(hint_text), Some(llm)) = (answers.hint.as_deref(), &self.llm) {
            let keywords = llm.translate_hint_keywords(hint_text).await;
            hint_result.llm_keywords.extend(keywords);
        }

        // Hint overrides beat the button answers.
        let mut effective = answers.clone();
        if let Some(state) = hint_result.overrides.state {
            effective.state = state;
        }
        if let Some(pace) = hint_result.overrides.pace {
            effective.pace = pace;
        }
        if let Some(format) = hint_result.overrides.format {
            effective.format = format;
        }

        let mut delta = DeltaInfo::default();
        let mut delta_explainer = None;
        if mode == Mode::Another {
            if let Some(last) = last_context {
                let (info, explainer) = apply_another_delta(&mut effective, last);
                delta = info;
                delta_explainer = Some(explainer);
            }
        }

        let excluded = excluded_item_ids(
            self.selections.as_ref(),
            self.prefs.as_ref(),
            user_id,
            exclude_item_ids,
            self.config.recs.anti_repeat_days,
        )
        .await?;

        let candidates = self.fetch_candidates(&effective, &excluded).await?;
        if candidates.is_empty() {
            warn!(user_id, item_type = effective.format.label(), "no candidates");
            return Ok(None);
        }

        let seed = deterministic_seed(user_id, Utc::now().date_naive(), mode);
        let user_weight = self
            .weights
            .get_weight(user_id, &context_key(&effective))
            .await?;

        let scored = score_candidates(
            candidates,
            &effective,
            user_weight,
            seed,
            &hint_result,
            self.config.recs.require_tags,
            self.config.recs.weight_multiplier,
        );
        if scored.is_empty() {
            warn!(user_id, "no scored candidates after tag filtering");
            return Ok(None);
        }

        let epsilon = self.config.recs.epsilon;
        let selected = match epsilon_greedy_select(
            &scored,
            epsilon,
            seed,
            self.config.recs.explore_top_k,
        ) {
            Some(selected) => selected,
            None => return Ok(None),
        };

        let context = SelectionContext {
            state: effective.state,
            pace: effective.pace,
            format: effective.format,
            mode,
            epsilon_used: epsilon,
            candidate_count: scored.len(),
            selected_score: selected.score,
            tone_bucket: tone_bucket(selected.tags.as_ref()).to_string(),
            hint: answers.hint.clone(),
            delta,
        };

        let selection_id = self
            .selections
            .create_selection(user_id, &selected.item.item_id, &context)
            .await?;

        let rationale = generate_rationale(&selection_id, &effective);
        let when_to_watch = generate_when_to_watch(&selection_id, &effective);

        let hint_rationale = match (answers.hint.as_deref(), &self.llm) {
            (Some(hint_text), Some(llm)) => {
                llm.hint_rationale(
                    hint_text,
                    &selected.item.title,
                    selected.item.overview.as_deref(),
                )
                .await
            }
            _ => None,
        };

        let curated_count = scored
            .iter()
            .filter(|s| s.item.source == ItemSource::Curated)
            .count();

        info!(
            user_id,
            selection_id = %selection_id,
            item_id = %selected.item.item_id,
            mode = mode.label(),
            score = selected.score,
            candidate_count = scored.len(),
            "selection created"
        );

        Ok(Some(RecommendationResult {
            selection_id,
            item_id: selected.item.item_id.clone(),
            title: selected.item.title.clone(),
            rationale,
            when_to_watch,
            poster_url: selected.item.poster_url.clone(),
            rating: selected.item.rating,
            delta_explainer,
            hint_rationale,
            meta: SelectionMeta {
                mode,
                epsilon_used: epsilon,
                candidate_count: scored.len(),
                curated_count,
                external_count: scored.len() - curated_count,
                score: selected.score,
            },
        }))
    }

    /// Apply feedback for a prior selection; see `learning::update_weights`.
    pub async fn update_weights(
        &self,
        user_id: &str,
        selection_id: &str,
        action: &str,
        reason: Option<&str>,
    ) -> Result<HashMap<String, i64>, StoreError> {
        learning::update_weights(
            self.selections.as_ref(),
            self.weights.as_ref(),
            user_id,
            selection_id,
            action,
            reason,
        )
        .await
    }

    pub async fn reset_weights(&self, user_id: &str) -> Result<(), StoreError> {
        learning::reset_weights(self.weights.as_ref(), user_id).await
    }

    pub async fn all_weights(&self, user_id: &str) -> Result<HashMap<String, i64>, StoreError> {
        self.weights.get_all_weights(user_id).await
    }

    /// Curated items first when preferred; thin curated pools are topped
    /// up with external items, never re-fetching ids already chosen.
    async fn fetch_candidates(
        &self,
        answers: &Answers,
        excluded: &HashSet<String>,
    ) -> Result<Vec<Item>, StoreError> {
        let limit = self.config.recs.max_candidates;
        let exclude = (!excluded.is_empty()).then(|| excluded.clone());

        if !self.config.recs.prefer_curated {
            return self
                .catalog
                .list_candidates(&CandidateQuery {
                    item_type: Some(answers.format),
                    source_preference: None,
                    exclude_ids: exclude,
                    limit,
                    randomize: false,
                })
                .await;
        }

        let curated = self
            .catalog
            .list_candidates(&CandidateQuery {
                item_type: Some(answers.format),
                source_preference: Some(ItemSource::Curated),
                exclude_ids: exclude.clone(),
                limit,
                randomize: false,
            })
            .await?;

        if curated.len() >= self.config.recs.min_curated {
            return Ok(curated);
        }

        let needed = limit.saturating_sub(curated.len());
        let mut all_excluded = excluded.clone();
        all_excluded.extend(curated.iter().map(|c| c.item_id.clone()));

        let external = self
            .catalog
            .list_candidates(&CandidateQuery {
                item_type: Some(answers.format),
                source_preference: Some(ItemSource::External),
                exclude_ids: (!all_excluded.is_empty()).then_some(all_excluded),
                limit: needed,
                randomize: false,
            })
            .await?;

        let mut combined = curated;
        combined.extend(external);
        Ok(combined)
    }
}

/// Two-state delta machine for "show me something different": first flip
/// the pace; once the prior pick already flipped it, keep the answers and
/// let the fresh novelty seed vary the tone instead.
fn apply_another_delta(effective: &mut Answers, last: &LastContext) -> (DeltaInfo, String) {
    let mut delta = DeltaInfo::default();

    if !last.delta.pace_flipped {
        let new_pace = effective.pace.flipped();
        effective.pace = new_pace;
        delta.pace_flipped = true;
        let explainer = generate_delta_explainer(DeltaKind::PaceFlipped, new_pace.label(), "delta");
        return (delta, explainer);
    }

    delta.tone_shifted = true;
    let explainer = generate_delta_explainer(DeltaKind::ToneShifted, "", "delta");
    (delta, explainer)
}

/// Seed for one (user, day, mode) triple; stable within the day.
pub fn deterministic_seed(user_id: &str, date: NaiveDate, mode: Mode) -> u64 {
    stable_hash64(&format!("{}:{}:{}", user_id, date, mode.label()))
}

/// Small deterministic jitter in [0.0, 0.2) mixing the item id with the
/// request seed, so ordering is stable within a day but shifts across days.
pub fn novelty_bonus(item_id: &str, seed: u64) -> f64 {
    let mixed = stable_hash64(&format!("{}:{}", item_id, seed));
    (mixed % 10_000) as f64 / 10_000.0 * 0.2
}

pub fn score_candidates(
    candidates: Vec<Item>,
    answers: &Answers,
    user_weight: i64,
    seed: u64,
    hint: &HintResult,
    require_tags: bool,
    weight_multiplier: f64,
) -> Vec<ScoredCandidate> {
    // The weight is context-level, identical for every candidate.
    let w_bonus = weight_bonus(user_weight, weight_multiplier);

    let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(candidates.len());
    for item in candidates {
        let tags = parse_tags(item.tags_json.as_deref());

        let m_score = match_score(tags.as_ref(), answers, require_tags);
        if m_score == f64::NEG_INFINITY {
            continue;
        }

        let n_bonus = novelty_bonus(&item.item_id, seed);
        let h_bonus = hint_match_score(
            &item.title,
            tags.as_ref(),
            hint,
            item.overview.as_deref(),
            item.genres.as_deref(),
            item.credits.as_deref(),
        );

        let total = item.base_score + m_score + w_bonus + n_bonus + h_bonus;
        scored.push(ScoredCandidate {
            item,
            tags,
            score: total,
            match_score: m_score,
            weight_bonus: w_bonus,
            novelty_bonus: n_bonus,
            hint_bonus: h_bonus,
        });
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// Epsilon-greedy over a score-sorted candidate list: exploit the top
/// candidate with probability 1-epsilon, otherwise explore uniformly
/// among the top `top_k`. Pure in the seed, so tests can enumerate both
/// paths.
pub fn epsilon_greedy_select(
    scored: &[ScoredCandidate],
    epsilon: f64,
    seed: u64,
    top_k: usize,
) -> Option<&ScoredCandidate> {
    if scored.is_empty() {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    if rng.gen::<f64>() < epsilon {
        let k = top_k.max(1).min(scored.len());
        let idx = rng.gen_range(0..k);
        Some(&scored[idx])
    } else {
        Some(&scored[0])
    }
}
