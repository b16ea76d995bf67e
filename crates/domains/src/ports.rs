//! # Ports
//!
//! Contracts for the external collaborators the core talks to. Adapters in
//! `storage-adapters` implement them; services only ever see the traits.
//!
//! Every method reports failure through [`StoreError`]. Services decide what
//! a failure means for the flow in progress.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::StoreResult;
use crate::models::{
    ActivityEntry, ActivityLog, Quest, QuestId, QuestProgress, Reward, RewardId, Submission,
    SubmissionId, SubmissionReview, SubmissionStatus, User, UserId,
};

/// Read side of the quest catalog plus admin writes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait QuestCatalog: Send + Sync {
    /// Active quests, newest first.
    async fn list_quests(&self) -> StoreResult<Vec<Quest>>;
    /// Looks up a quest whether or not it is active.
    async fn get_quest(&self, id: QuestId) -> StoreResult<Option<Quest>>;
    async fn insert_quest(&self, quest: Quest) -> StoreResult<Quest>;
    /// Replaces an existing quest. `NotFound` if the id is unknown.
    async fn save_quest(&self, quest: Quest) -> StoreResult<Quest>;
}

/// Per-user quest progress.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress(&self, user_id: UserId, quest_id: QuestId) -> StoreResult<Option<QuestProgress>>;
    async fn list_progress(&self, user_id: UserId) -> StoreResult<Vec<QuestProgress>>;
    async fn save_progress(&self, progress: QuestProgress) -> StoreResult<()>;
}

/// Manual-verification proof records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn record_submission(&self, submission: Submission) -> StoreResult<Submission>;
    /// Applies a decision. `Conflict` if the submission was already decided.
    async fn update_submission_status(
        &self,
        id: SubmissionId,
        review: SubmissionReview,
    ) -> StoreResult<Submission>;
    /// Returns a decided submission to `Pending`, clearing the review.
    async fn reopen_submission(&self, id: SubmissionId) -> StoreResult<Submission>;
    async fn get_submission(&self, id: SubmissionId) -> StoreResult<Option<Submission>>;
    /// Newest first. `None` lists every status.
    async fn list_submissions(&self, status: Option<SubmissionStatus>) -> StoreResult<Vec<Submission>>;
}

/// Users, and the single entry point for point mutations.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Re-checks the balance at commit time; `InsufficientFunds` if the
    /// adjustment would make it negative. Either fully applied or not at all.
    async fn adjust_points(&self, id: UserId, delta: i64) -> StoreResult<User>;
    /// XP gain and completion counter.
    async fn record_progression(&self, id: UserId, xp: u32, counts_toward_total: bool) -> StoreResult<User>;
    /// Persists profile and onboarding fields only; balances are untouched.
    async fn save_profile(&self, user: User) -> StoreResult<User>;
}

/// Reward catalog plus stock accounting.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RewardCatalog: Send + Sync {
    /// Every reward regardless of status.
    async fn list_rewards(&self) -> StoreResult<Vec<Reward>>;
    async fn get_reward(&self, id: RewardId) -> StoreResult<Option<Reward>>;
    async fn insert_reward(&self, reward: Reward) -> StoreResult<Reward>;
    async fn save_reward(&self, reward: Reward) -> StoreResult<Reward>;
    /// Atomically removes one unit of stock; `OutOfStock` when exhausted.
    async fn take_stock(&self, id: RewardId) -> StoreResult<Reward>;
    async fn return_stock(&self, id: RewardId) -> StoreResult<Reward>;
}

/// Append-only activity history.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn append(&self, user_id: UserId, entry: ActivityEntry) -> StoreResult<()>;
    async fn history(&self, user_id: UserId) -> StoreResult<ActivityLog>;
}

/// Source of "now" and of the current calendar day.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    /// The calendar day daily quests are compared against.
    fn today(&self) -> NaiveDate;
}
