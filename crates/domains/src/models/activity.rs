//! Append-only history of point-affecting events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::ids::ActivityId;

labelled_enum!(
    ActivityKind {
        Success => "SUCCESS",
        Failed => "FAILED",
        Claim => "CLAIM",
    }
);

/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: ActivityId,
    pub kind: ActivityKind,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Signed point delta, absent for events that moved no points
    pub points: Option<i64>,
}

impl ActivityEntry {
    pub fn quest_completed(title: &str, reward: u32, at: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::new(),
            kind: ActivityKind::Success,
            description: format!("Completed \"{title}\""),
            date: at,
            points: Some(i64::from(reward)),
        }
    }

    pub fn submission_rejected(title: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::new(),
            kind: ActivityKind::Failed,
            description: format!("Submission for \"{title}\" rejected"),
            date: at,
            points: None,
        }
    }

    pub fn reward_claimed(name: &str, cost: u64, at: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::new(),
            kind: ActivityKind::Claim,
            description: format!("Claimed \"{name}\""),
            date: at,
            points: Some(-i64::try_from(cost).unwrap_or(i64::MAX)),
        }
    }
}

/// A user's log, newest entry first. There is no way to edit or remove an
/// entry once appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ActivityEntry) {
        self.entries.push_front(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// `None` means all kinds.
    pub fn filter_by_kind(&self, kind: Option<ActivityKind>) -> Vec<&ActivityEntry> {
        self.entries
            .iter()
            .filter(|e| kind.map_or(true, |wanted| wanted == e.kind))
            .collect()
    }

    pub fn count(&self, kind: ActivityKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ActivityEntry> for ActivityLog {
    /// Builds a log from entries given oldest first.
    fn from_iter<I: IntoIterator<Item = ActivityEntry>>(iter: I) -> Self {
        let mut log = ActivityLog::new();
        for entry in iter {
            log.append(entry);
        }
        log
    }
}
