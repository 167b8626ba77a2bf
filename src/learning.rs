use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::storage::{SelectionStore, StoreError, WeightStore};
use crate::tags::context_key;
use crate::{Answers, FeedbackAction, MissReason};

pub const DEFAULT_WEIGHT_MULTIPLIER: f64 = 0.25;
const SOFT_CAP: i64 = 10;

/// Fixed reward per feedback action.
pub fn reward_for(action: FeedbackAction) -> i64 {
    match action {
        FeedbackAction::Hit => 2,
        FeedbackAction::Favorite => 2,
        FeedbackAction::Share => 2,
        FeedbackAction::Another => 1,
        FeedbackAction::SilentDrop => -1,
        FeedbackAction::Miss => -2,
    }
}

/// Convert an accumulated weight into a bounded scoring bonus.
///
/// Linear within |weight| <= 10, then log-damped so heavily reinforced
/// contexts keep gaining signal without dominating the score.
pub fn weight_bonus(weight: i64, multiplier: f64) -> f64 {
    if weight.abs() <= SOFT_CAP {
        weight as f64 * multiplier
    } else {
        let sign = if weight > 0 { 1.0 } else { -1.0 };
        let capped = SOFT_CAP as f64 + ((weight.abs() - SOFT_CAP + 1) as f64).ln();
        sign * capped * multiplier
    }
}

/// Apply feedback to the weight bucket of the context that was actually
/// shown, plus any miss-reason correction.
///
/// Unknown actions and missing selection records are logged no-ops; only
/// storage-transport failures propagate.
pub async fn update_weights(
    selections: &dyn SelectionStore,
    weights: &dyn WeightStore,
    user_id: &str,
    selection_id: &str,
    action: &str,
    reason: Option<&str>,
) -> Result<HashMap<String, i64>, StoreError> {
    let record = match selections.get_selection(selection_id).await? {
        Some(record) => record,
        None => {
            warn!(selection_id, "selection not found for weight update");
            return Ok(HashMap::new());
        }
    };

    let feedback = match FeedbackAction::from_str(action) {
        Some(feedback) => feedback,
        None => {
            warn!(action, "unknown feedback action");
            return Ok(HashMap::new());
        }
    };

    // The weight attaches to the context snapshot stored with the
    // selection, not to whatever the caller currently believes.
    let answers = Answers::new(
        record.context.state,
        record.context.pace,
        record.context.format,
    );
    let key = context_key(&answers);

    let reward = reward_for(feedback);
    let mut changes: HashMap<String, i64> = HashMap::new();

    weights.add_weight_delta(user_id, &key, reward).await?;
    *changes.entry(key.clone()).or_insert(0) += reward;
    debug!(user_id, key = %key, delta = reward, "applied weight delta");

    if feedback == FeedbackAction::Miss {
        if let Some(reason) = reason.and_then(MissReason::from_str) {
            match reason {
                MissReason::TooSlow => {
                    let mut alt = answers.clone();
                    alt.pace = alt.pace.flipped();
                    let alt_key = context_key(&alt);
                    weights.add_weight_delta(user_id, &alt_key, 1).await?;
                    *changes.entry(alt_key).or_insert(0) += 1;
                }
                MissReason::TooHeavy => {
                    if let Some(opposite) = answers.state.opposite() {
                        let mut alt = answers.clone();
                        alt.state = opposite;
                        let alt_key = context_key(&alt);
                        weights.add_weight_delta(user_id, &alt_key, 1).await?;
                        *changes.entry(alt_key).or_insert(0) += 1;
                    }
                }
                MissReason::NotVibe => {
                    // No structural correction exists for this yet; a
                    // tone-bucket weight key would be the place to add one.
                }
            }
        }
    }

    // Audit record; must never fail the update.
    info!(
        user_id,
        selection_id,
        action = feedback.label(),
        reason,
        context_key = %key,
        changes = ?changes,
        "weights updated"
    );

    Ok(changes)
}

/// Clear all learned bias for a user. Selection records and feedback
/// history are untouched.
pub async fn reset_weights(weights: &dyn WeightStore, user_id: &str) -> Result<(), StoreError> {
    weights.reset_all_weights(user_id).await?;
    info!(user_id, "weights reset");
    Ok(())
}
