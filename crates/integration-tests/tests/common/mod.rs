//! Shared wiring for the service-level tests: in-memory adapters, a settable
//! clock and one admin account.

#![allow(dead_code)]

use std::sync::Arc;

use api_adapters::{AppOptions, AppState};
use chrono::NaiveDate;
use domains::{
    NewQuest, NewReward, Platform, Quest, QuestType, Reward, RewardKind, Role, User, UserStore,
    VerificationType,
};
use services::{FixedClock, Ports};
use storage_adapters::memory::{
    InMemoryActivityStore, InMemoryProgressStore, InMemoryQuestCatalog, InMemoryRewardCatalog,
    InMemorySubmissionStore, InMemoryUserStore,
};

pub struct World {
    pub state: AppState,
    pub ports: Ports,
    pub clock: Arc<FixedClock>,
    pub admin: User,
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn memory_ports(clock: Arc<FixedClock>, users: Arc<dyn UserStore>) -> Ports {
    Ports {
        quests: Arc::new(InMemoryQuestCatalog::new()),
        progress: Arc::new(InMemoryProgressStore::new()),
        submissions: Arc::new(InMemorySubmissionStore::new()),
        users,
        rewards: Arc::new(InMemoryRewardCatalog::new()),
        activity: Arc::new(InMemoryActivityStore::new()),
        clock,
    }
}

impl World {
    pub async fn new() -> Self {
        Self::with(Arc::new(InMemoryUserStore::new()), AppOptions::default()).await
    }

    pub async fn with(users: Arc<dyn UserStore>, options: AppOptions) -> Self {
        let clock = Arc::new(FixedClock::on(start_date()));
        let ports = memory_ports(Arc::clone(&clock), users);
        let state = AppState::new(&ports, options);
        let admin = state.profile.register("Quest Master", Role::Admin).await.unwrap();
        Self {
            state,
            ports,
            clock,
            admin,
        }
    }

    pub async fn player(&self, name: &str) -> User {
        self.state.profile.register(name, Role::User).await.unwrap()
    }

    pub async fn quest(&self, input: NewQuest) -> Quest {
        self.state.catalog.create_quest(&self.admin, input).await.unwrap()
    }

    pub async fn reward(&self, name: &str, cost: u64, quantity: Option<u32>) -> Reward {
        let input = NewReward {
            name: name.into(),
            description: String::new(),
            cost,
            image_url: None,
            kind: RewardKind::Digital,
            quantity,
        };
        self.state.catalog.create_reward(&self.admin, input).await.unwrap()
    }

    pub async fn points(&self, user: &User) -> u64 {
        self.state.profile.me(user.id).await.unwrap().points
    }

    pub fn next_day(&self) {
        self.clock.advance(chrono::Duration::days(1));
    }
}

pub fn automatic(title: &str, platform: Platform, reward: u32) -> NewQuest {
    NewQuest {
        title: title.into(),
        description: String::new(),
        platform,
        quest_type: QuestType::Visit,
        difficulty: None,
        reward,
        verification: VerificationType::Automatic,
        quest_url: String::new(),
        validation_code: None,
        is_daily: false,
        is_new: true,
        is_sponsored: false,
    }
}

pub fn manual(title: &str, platform: Platform, reward: u32) -> NewQuest {
    NewQuest {
        quest_type: QuestType::Follow,
        verification: VerificationType::Manual,
        ..automatic(title, platform, reward)
    }
}

pub fn daily_watch(code: &str, reward: u32) -> NewQuest {
    NewQuest {
        quest_type: QuestType::Watch,
        validation_code: Some(code.into()),
        is_daily: true,
        ..automatic("Watch: Top 10 Gaming Tips", Platform::YouTube, reward)
    }
}
