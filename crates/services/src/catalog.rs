//! # Catalog administration
//!
//! Quest and reward authoring. Writes require the admin role; the reward
//! listing is public.

use std::sync::Arc;

use domains::{
    Clock, NewQuest, NewReward, Quest, QuestCatalog, QuestId, QuestPatch, Reward, RewardCatalog,
    RewardId, RewardPatch, RewardStatus, User,
};

use crate::errors::ServiceError;
use crate::Ports;

fn require_admin(user: &User, action: &'static str) -> Result<(), ServiceError> {
    if user.is_admin() {
        return Ok(());
    }
    tracing::warn!(user_id = %user.id, action, "admin action refused");
    Err(ServiceError::Forbidden(action))
}

pub struct CatalogService {
    quests: Arc<dyn QuestCatalog>,
    rewards: Arc<dyn RewardCatalog>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(ports: &Ports) -> Self {
        Self {
            quests: Arc::clone(&ports.quests),
            rewards: Arc::clone(&ports.rewards),
            clock: Arc::clone(&ports.clock),
        }
    }

    pub async fn create_quest(&self, admin: &User, input: NewQuest) -> Result<Quest, ServiceError> {
        require_admin(admin, "create quests")?;
        let quest = self.quests.insert_quest(Quest::new(input, self.clock.now())?).await?;
        tracing::info!(quest_id = %quest.id, title = %quest.title, "quest created");
        Ok(quest)
    }

    pub async fn update_quest(&self, admin: &User, id: QuestId, patch: QuestPatch) -> Result<Quest, ServiceError> {
        require_admin(admin, "edit quests")?;
        let mut quest = self
            .quests
            .get_quest(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quest", id))?;
        quest.apply(patch)?;
        Ok(self.quests.save_quest(quest).await?)
    }

    /// Hides the quest from the board. Progress and history are kept.
    pub async fn deactivate_quest(&self, admin: &User, id: QuestId) -> Result<Quest, ServiceError> {
        require_admin(admin, "delete quests")?;
        let mut quest = self
            .quests
            .get_quest(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quest", id))?;
        if !quest.is_active {
            return Ok(quest);
        }
        quest.is_active = false;
        let quest = self.quests.save_quest(quest).await?;
        tracing::info!(quest_id = %quest.id, "quest deactivated");
        Ok(quest)
    }

    /// Active rewards, cheapest first.
    pub async fn list_rewards(&self) -> Result<Vec<Reward>, ServiceError> {
        let mut rewards: Vec<Reward> = self
            .rewards
            .list_rewards()
            .await?
            .into_iter()
            .filter(Reward::is_active)
            .collect();
        rewards.sort_by_key(|r| r.cost);
        Ok(rewards)
    }

    pub async fn create_reward(&self, admin: &User, input: NewReward) -> Result<Reward, ServiceError> {
        require_admin(admin, "create rewards")?;
        let reward = self.rewards.insert_reward(Reward::new(input, self.clock.now())?).await?;
        tracing::info!(reward_id = %reward.id, name = %reward.name, cost = reward.cost, "reward created");
        Ok(reward)
    }

    pub async fn update_reward(&self, admin: &User, id: RewardId, patch: RewardPatch) -> Result<Reward, ServiceError> {
        require_admin(admin, "edit rewards")?;
        let mut reward = self
            .rewards
            .get_reward(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("reward", id))?;
        reward.apply(patch)?;
        Ok(self.rewards.save_reward(reward).await?)
    }

    pub async fn set_reward_status(&self, admin: &User, id: RewardId, status: RewardStatus) -> Result<Reward, ServiceError> {
        self.update_reward(
            admin,
            id,
            RewardPatch {
                status: Some(status),
                ..RewardPatch::default()
            },
        )
        .await
    }
}
