//! Per-user, per-quest progress.
//!
//! Daily quests never set `completed`; they lock by comparing
//! `daily_completion_date` with the current calendar day, so no scheduler is
//! needed to reopen them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{QuestId, UserId};
use super::quest::Quest;
use super::submission::SubmissionStatus;

/// Derived lifecycle position of one quest for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestState {
    Available,
    Viewed,
    /// Manual proof submitted, awaiting review
    Pending,
    /// Manual proof refused; may be resubmitted
    Rejected,
    /// Completed for the current cycle (forever, for non-daily quests)
    Locked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub user_id: UserId,
    pub quest_id: QuestId,
    pub viewed: bool,
    pub submission_status: Option<SubmissionStatus>,
    /// Reviewer note from the latest rejection, cleared on resubmission
    pub rejection_note: Option<String>,
    /// Permanent completion marker, non-daily quests only
    pub completed: bool,
    pub daily_completion_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl QuestProgress {
    pub fn new(user_id: UserId, quest_id: QuestId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            quest_id,
            viewed: false,
            submission_status: None,
            rejection_note: None,
            completed: false,
            daily_completion_date: None,
            updated_at: at,
        }
    }

    pub fn is_locked(&self, quest: &Quest, today: NaiveDate) -> bool {
        if quest.is_daily {
            self.daily_completion_date == Some(today)
        } else {
            self.completed
        }
    }

    /// True when a daily quest was completed on an earlier day and its cycle
    /// has not been restarted yet.
    fn has_stale_daily_cycle(&self, quest: &Quest, today: NaiveDate) -> bool {
        quest.is_daily && matches!(self.daily_completion_date, Some(day) if day < today)
    }

    pub fn state(&self, quest: &Quest, today: NaiveDate) -> QuestState {
        if self.is_locked(quest, today) {
            return QuestState::Locked;
        }
        if self.has_stale_daily_cycle(quest, today) {
            return QuestState::Available;
        }
        match self.submission_status {
            Some(SubmissionStatus::Pending) => QuestState::Pending,
            Some(SubmissionStatus::Rejected) => QuestState::Rejected,
            _ if self.viewed => QuestState::Viewed,
            _ => QuestState::Available,
        }
    }

    /// Restarts a daily quest whose last completion was before `today`.
    /// Returns whether anything changed.
    pub fn roll_daily_cycle(&mut self, quest: &Quest, today: NaiveDate) -> bool {
        if !self.has_stale_daily_cycle(quest, today) {
            return false;
        }
        self.daily_completion_date = None;
        self.submission_status = None;
        self.rejection_note = None;
        true
    }

    /// Returns true on the first view only.
    pub fn mark_viewed(&mut self, at: DateTime<Utc>) -> bool {
        if self.viewed {
            return false;
        }
        self.viewed = true;
        self.updated_at = at;
        true
    }

    pub fn mark_pending(&mut self, at: DateTime<Utc>) {
        self.submission_status = Some(SubmissionStatus::Pending);
        self.rejection_note = None;
        self.updated_at = at;
    }

    pub fn mark_rejected(&mut self, note: Option<String>, at: DateTime<Utc>) {
        self.submission_status = Some(SubmissionStatus::Rejected);
        self.rejection_note = note;
        self.updated_at = at;
    }

    /// Closes the current cycle. `approved` is set for manual quests so the
    /// submission history stays visible.
    pub fn mark_completed(&mut self, quest: &Quest, today: NaiveDate, at: DateTime<Utc>, approved: bool) {
        if quest.is_daily {
            self.daily_completion_date = Some(today);
        } else {
            self.completed = true;
        }
        if approved {
            self.submission_status = Some(SubmissionStatus::Approved);
        }
        self.rejection_note = None;
        self.updated_at = at;
    }
}
