//! # Quest board filtering
//!
//! Pure functions over the catalog and a user's progress sets. They never
//! touch a store and are recomputed on every board render.

use std::collections::{BTreeSet, HashSet};

use domains::{Quest, QuestFilter, QuestId};
use serde::Serialize;

/// Unseen-quest summary for the tab badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewQuestInfo {
    pub count: usize,
    pub categories: BTreeSet<QuestFilter>,
}

impl NewQuestInfo {
    pub fn has_new(&self, category: QuestFilter) -> bool {
        (category == QuestFilter::All && self.count > 0) || self.categories.contains(&category)
    }
}

/// Counts quests flagged new that the user has neither viewed nor completed,
/// and collects the tabs they belong to.
pub fn derive_new_quest_info(
    quests: &[Quest],
    viewed: &HashSet<QuestId>,
    completed: &HashSet<QuestId>,
) -> NewQuestInfo {
    let mut info = NewQuestInfo::default();
    for quest in quests
        .iter()
        .filter(|q| q.is_new && !viewed.contains(&q.id) && !completed.contains(&q.id))
    {
        info.count += 1;
        info.categories.extend(quest.badge_categories());
    }
    info
}

/// Orders incomplete quests before completed ones, then keeps the ones that
/// belong to `filter`. The sort is stable so catalog order survives within
/// each group.
pub fn filter_and_sort<'a>(
    quests: &'a [Quest],
    filter: QuestFilter,
    completed: &HashSet<QuestId>,
) -> Vec<&'a Quest> {
    let mut sorted: Vec<&Quest> = quests.iter().collect();
    sorted.sort_by_key(|q| completed.contains(&q.id));
    sorted.retain(|q| q.matches(filter));
    sorted
}

/// Parses a tab name coming from a client. Unknown names fall back to
/// [`QuestFilter::All`].
pub fn resolve_filter(raw: Option<&str>) -> QuestFilter {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return QuestFilter::All;
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(filter = raw, "unknown quest filter, showing all quests");
        QuestFilter::All
    })
}
