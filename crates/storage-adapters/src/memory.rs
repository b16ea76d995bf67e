//! # In-memory adapters
//!
//! DashMap-backed port implementations. Balance and stock changes run under
//! the shard lock of the entry they touch, so the check and the write are a
//! single atomic step.

use async_trait::async_trait;
use dashmap::DashMap;

use domains::{
    ActivityEntry, ActivityLog, ActivityStore, ProgressStore, Quest, QuestCatalog, QuestId,
    QuestProgress, Reward, RewardCatalog, RewardId, StoreError, StoreResult, Submission,
    SubmissionId, SubmissionReview, SubmissionStatus, SubmissionStore, User, UserId, UserStore,
};

#[derive(Debug, Default)]
pub struct InMemoryQuestCatalog {
    quests: DashMap<QuestId, Quest>,
}

impl InMemoryQuestCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestCatalog for InMemoryQuestCatalog {
    async fn list_quests(&self) -> StoreResult<Vec<Quest>> {
        let mut quests: Vec<Quest> = self
            .quests
            .iter()
            .filter(|q| q.is_active)
            .map(|q| q.value().clone())
            .collect();
        quests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(quests)
    }

    async fn get_quest(&self, id: QuestId) -> StoreResult<Option<Quest>> {
        Ok(self.quests.get(&id).map(|q| q.value().clone()))
    }

    async fn insert_quest(&self, quest: Quest) -> StoreResult<Quest> {
        if self.quests.contains_key(&quest.id) {
            return Err(StoreError::Conflict(format!("quest {} already exists", quest.id)));
        }
        self.quests.insert(quest.id, quest.clone());
        Ok(quest)
    }

    async fn save_quest(&self, quest: Quest) -> StoreResult<Quest> {
        let mut slot = self
            .quests
            .get_mut(&quest.id)
            .ok_or_else(|| StoreError::not_found("quest", quest.id))?;
        *slot = quest.clone();
        Ok(quest)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    progress: DashMap<(UserId, QuestId), QuestProgress>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn get_progress(&self, user_id: UserId, quest_id: QuestId) -> StoreResult<Option<QuestProgress>> {
        Ok(self.progress.get(&(user_id, quest_id)).map(|p| p.value().clone()))
    }

    async fn list_progress(&self, user_id: UserId) -> StoreResult<Vec<QuestProgress>> {
        Ok(self
            .progress
            .iter()
            .filter(|p| p.key().0 == user_id)
            .map(|p| p.value().clone())
            .collect())
    }

    async fn save_progress(&self, progress: QuestProgress) -> StoreResult<()> {
        self.progress.insert((progress.user_id, progress.quest_id), progress);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    submissions: DashMap<SubmissionId, Submission>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn record_submission(&self, submission: Submission) -> StoreResult<Submission> {
        self.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn update_submission_status(
        &self,
        id: SubmissionId,
        review: SubmissionReview,
    ) -> StoreResult<Submission> {
        let mut slot = self
            .submissions
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("submission", id))?;
        slot.resolve(review)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        Ok(slot.clone())
    }

    async fn reopen_submission(&self, id: SubmissionId) -> StoreResult<Submission> {
        let mut slot = self
            .submissions
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("submission", id))?;
        slot.reopen();
        Ok(slot.clone())
    }

    async fn get_submission(&self, id: SubmissionId) -> StoreResult<Option<Submission>> {
        Ok(self.submissions.get(&id).map(|s| s.value().clone()))
    }

    async fn list_submissions(&self, status: Option<SubmissionStatus>) -> StoreResult<Vec<Submission>> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .map(|s| s.value().clone())
            .collect();
        submissions.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(submissions)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<UserId, User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        if self.users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    /// Registration order.
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn adjust_points(&self, id: UserId, delta: i64) -> StoreResult<User> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        if user.adjust_points(delta).is_none() {
            return Err(StoreError::InsufficientFunds {
                required: delta.unsigned_abs(),
                available: user.points,
            });
        }
        Ok(user.clone())
    }

    async fn record_progression(&self, id: UserId, xp: u32, counts_toward_total: bool) -> StoreResult<User> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        user.record_completion(xp, counts_toward_total);
        Ok(user.clone())
    }

    async fn save_profile(&self, profile: User) -> StoreResult<User> {
        let mut user = self
            .users
            .get_mut(&profile.id)
            .ok_or_else(|| StoreError::not_found("user", profile.id))?;
        user.display_name = profile.display_name;
        user.socials = profile.socials;
        user.onboarding = profile.onboarding;
        Ok(user.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRewardCatalog {
    rewards: DashMap<RewardId, Reward>,
}

impl InMemoryRewardCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardCatalog for InMemoryRewardCatalog {
    async fn list_rewards(&self) -> StoreResult<Vec<Reward>> {
        let mut rewards: Vec<Reward> = self.rewards.iter().map(|r| r.value().clone()).collect();
        rewards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rewards)
    }

    async fn get_reward(&self, id: RewardId) -> StoreResult<Option<Reward>> {
        Ok(self.rewards.get(&id).map(|r| r.value().clone()))
    }

    async fn insert_reward(&self, reward: Reward) -> StoreResult<Reward> {
        if self.rewards.contains_key(&reward.id) {
            return Err(StoreError::Conflict(format!("reward {} already exists", reward.id)));
        }
        self.rewards.insert(reward.id, reward.clone());
        Ok(reward)
    }

    async fn save_reward(&self, reward: Reward) -> StoreResult<Reward> {
        let mut slot = self
            .rewards
            .get_mut(&reward.id)
            .ok_or_else(|| StoreError::not_found("reward", reward.id))?;
        *slot = reward.clone();
        Ok(reward)
    }

    async fn take_stock(&self, id: RewardId) -> StoreResult<Reward> {
        let mut reward = self
            .rewards
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("reward", id))?;
        if !reward.take_one() {
            return Err(StoreError::OutOfStock(reward.name.clone()));
        }
        Ok(reward.clone())
    }

    async fn return_stock(&self, id: RewardId) -> StoreResult<Reward> {
        let mut reward = self
            .rewards
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("reward", id))?;
        reward.return_one();
        Ok(reward.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    logs: DashMap<UserId, ActivityLog>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn append(&self, user_id: UserId, entry: ActivityEntry) -> StoreResult<()> {
        self.logs.entry(user_id).or_default().append(entry);
        Ok(())
    }

    async fn history(&self, user_id: UserId) -> StoreResult<ActivityLog> {
        Ok(self.logs.get(&user_id).map(|l| l.value().clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domains::{NewReward, RewardKind, Role};
    use std::sync::Arc;

    fn reward(quantity: Option<u32>) -> Reward {
        Reward::new(
            NewReward {
                name: "Discord Nitro - 1 Month".into(),
                description: String::new(),
                cost: 800,
                image_url: None,
                kind: RewardKind::Digital,
                quantity,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn overdraw_is_refused_and_balance_kept() {
        let store = InMemoryUserStore::new();
        let user = store
            .create_user(User::new("Ada", Role::User, 500, Utc::now()))
            .await
            .unwrap();
        store.adjust_points(user.id, 300).await.unwrap();

        let err = store.adjust_points(user.id, -500).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::InsufficientFunds {
                required: 500,
                available: 300
            }
        );
        assert_eq!(store.get_user(user.id).await.unwrap().unwrap().points, 300);
    }

    #[tokio::test]
    async fn concurrent_takes_never_oversell() {
        let catalog = Arc::new(InMemoryRewardCatalog::new());
        let r = catalog.insert_reward(reward(Some(5))).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                tokio::spawn(async move { catalog.take_stock(r.id).await.is_ok() })
            })
            .collect();
        let mut taken = 0;
        for handle in handles {
            if handle.await.unwrap() {
                taken += 1;
            }
        }

        assert_eq!(taken, 5);
        let r = catalog.get_reward(r.id).await.unwrap().unwrap();
        assert_eq!(r.quantity, Some(0));
        assert_eq!(r.claimed, 5);
    }

    #[tokio::test]
    async fn submissions_decide_once_and_list_newest_first() {
        let store = InMemorySubmissionStore::new();
        let t0 = Utc::now();
        let older = Submission::new(QuestId::new(), UserId::new(), "proof a".into(), t0);
        let newer = Submission::new(QuestId::new(), UserId::new(), "proof b".into(), t0 + Duration::minutes(5));
        store.record_submission(older.clone()).await.unwrap();
        store.record_submission(newer.clone()).await.unwrap();

        let review = SubmissionReview {
            reviewer: UserId::new(),
            status: SubmissionStatus::Approved,
            note: None,
            reviewed_at: t0,
        };
        store.update_submission_status(older.id, review.clone()).await.unwrap();
        assert!(matches!(
            store.update_submission_status(older.id, review).await,
            Err(StoreError::Conflict(_))
        ));

        let all = store.list_submissions(None).await.unwrap();
        assert_eq!(all[0].id, newer.id);
        let pending = store.list_submissions(Some(SubmissionStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);

        let reopened = store.reopen_submission(older.id).await.unwrap();
        assert_eq!(reopened.status, SubmissionStatus::Pending);
        assert!(reopened.reviewed_at.is_none());
        assert_eq!(store.list_submissions(Some(SubmissionStatus::Pending)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_profile_leaves_balances_alone() {
        let store = InMemoryUserStore::new();
        let user = store
            .create_user(User::new("Ada", Role::User, 500, Utc::now()))
            .await
            .unwrap();
        store.adjust_points(user.id, 120).await.unwrap();

        let mut stale = user.clone();
        stale.display_name = "Ada L.".into();
        let saved = store.save_profile(stale).await.unwrap();
        assert_eq!(saved.display_name, "Ada L.");
        assert_eq!(saved.points, 120);
    }
}
