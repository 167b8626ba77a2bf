use std::collections::HashSet;

use crate::storage::{PreferenceStore, SelectionStore, StoreError};

/// Compute the item ids a user must not be shown again.
///
/// Recent selections within `window_days` are excluded unless favorited;
/// dismissed items are excluded permanently, favorited or not.
pub async fn excluded_item_ids(
    selections: &dyn SelectionStore,
    prefs: &dyn PreferenceStore,
    user_id: &str,
    additional_excludes: Option<&HashSet<String>>,
    window_days: u32,
) -> Result<HashSet<String>, StoreError> {
    let recent = selections.list_recent_item_ids(user_id, window_days).await?;
    let dismissed = prefs.list_dismissed_item_ids(user_id).await?;

    if recent.is_empty() && dismissed.is_empty() {
        // Common case: nothing to bypass, so skip the favorites lookup.
        return Ok(additional_excludes.cloned().unwrap_or_default());
    }

    let favorited = prefs.list_favorite_item_ids(user_id).await?;

    let mut excluded: HashSet<String> = recent.difference(&favorited).cloned().collect();
    excluded.extend(dismissed);
    if let Some(additional) = additional_excludes {
        excluded.extend(additional.iter().cloned());
    }

    Ok(excluded)
}

/// Whether a single item is currently eligible for this user.
pub async fn is_item_allowed(
    selections: &dyn SelectionStore,
    prefs: &dyn PreferenceStore,
    user_id: &str,
    item_id: &str,
    window_days: u32,
) -> Result<bool, StoreError> {
    let excluded = excluded_item_ids(selections, prefs, user_id, None, window_days).await?;
    Ok(!excluded.contains(item_id))
}
