//! Sample catalog used by the `seed` binary and by in-memory runs.

use chrono::{DateTime, Duration, Utc};
use domains::{
    NewQuest, NewReward, Platform, Quest, QuestCatalog, QuestType, Reward, RewardCatalog, RewardKind,
    StoreError, StoreResult, VerificationType,
};

struct QuestSeed {
    title: &'static str,
    description: &'static str,
    platform: Platform,
    quest_type: QuestType,
    reward: u32,
    verification: VerificationType,
    url: &'static str,
    code: Option<&'static str>,
    is_daily: bool,
    is_new: bool,
}

const QUESTS: &[QuestSeed] = &[
    QuestSeed {
        title: "Subscribe to GameQuestHub Channel",
        description: "Subscribe to our official YouTube channel and hit the notification bell.",
        platform: Platform::YouTube,
        quest_type: QuestType::Subscribe,
        reward: 100,
        verification: VerificationType::Manual,
        url: "https://youtube.com/@gamequesthub",
        code: None,
        is_daily: false,
        is_new: true,
    },
    QuestSeed {
        title: "Watch: Top 10 Gaming Tips",
        description: "Watch the video to the end and enter the code shown in the outro.",
        platform: Platform::YouTube,
        quest_type: QuestType::Watch,
        reward: 75,
        verification: VerificationType::Automatic,
        url: "https://youtube.com/watch?v=example123",
        code: Some("GAMETIP2024"),
        is_daily: true,
        is_new: false,
    },
    QuestSeed {
        title: "Follow @GameQuestHub",
        description: "Follow our official X account for quest updates and exclusive content.",
        platform: Platform::Twitter,
        quest_type: QuestType::Follow,
        reward: 80,
        verification: VerificationType::Manual,
        url: "https://x.com/gamequesthub",
        code: None,
        is_daily: false,
        is_new: true,
    },
    QuestSeed {
        title: "Retweet Our Gaming Setup Post",
        description: "Retweet our latest post about the ultimate gaming setup and tag three friends.",
        platform: Platform::Twitter,
        quest_type: QuestType::Retweet,
        reward: 120,
        verification: VerificationType::Manual,
        url: "https://x.com/gamequesthub/status/123456789",
        code: None,
        is_daily: true,
        is_new: false,
    },
    QuestSeed {
        title: "Follow GameQuestHub on TikTok",
        description: "Follow our TikTok account for quick tips, reviews and gaming moments.",
        platform: Platform::TikTok,
        quest_type: QuestType::Follow,
        reward: 90,
        verification: VerificationType::Manual,
        url: "https://tiktok.com/@gamequesthub",
        code: None,
        is_daily: false,
        is_new: true,
    },
    QuestSeed {
        title: "Join GameQuestHub Discord",
        description: "Join the Discord community and say hello in #introductions.",
        platform: Platform::Discord,
        quest_type: QuestType::Join,
        reward: 200,
        verification: VerificationType::Manual,
        url: "https://discord.gg/gamequesthub",
        code: None,
        is_daily: false,
        is_new: true,
    },
    QuestSeed {
        title: "Join Telegram Gaming News",
        description: "Join our Telegram channel for instant gaming news.",
        platform: Platform::Telegram,
        quest_type: QuestType::Join,
        reward: 150,
        verification: VerificationType::Manual,
        url: "https://t.me/gamequesthub",
        code: None,
        is_daily: false,
        is_new: false,
    },
    QuestSeed {
        title: "Try Epic Games Store - Free Game",
        description: "Claim this week's free game and send a screenshot of your library.",
        platform: Platform::Partner,
        quest_type: QuestType::Visit,
        reward: 500,
        verification: VerificationType::Manual,
        url: "https://store.epicgames.com/en-US/free-games",
        code: None,
        is_daily: false,
        is_new: true,
    },
    QuestSeed {
        title: "Visit the GameQuestHub Blog",
        description: "Read this week's patch notes roundup.",
        platform: Platform::Custom,
        quest_type: QuestType::Visit,
        reward: 40,
        verification: VerificationType::Automatic,
        url: "https://gamequesthub.com/blog",
        code: None,
        is_daily: true,
        is_new: true,
    },
];

struct RewardSeed {
    name: &'static str,
    description: &'static str,
    cost: u64,
    kind: RewardKind,
    quantity: u32,
}

const REWARDS: &[RewardSeed] = &[
    RewardSeed {
        name: "Steam $5 Gift Card",
        description: "A $5 Steam gift card for games or in-game content.",
        cost: 500,
        kind: RewardKind::Digital,
        quantity: 100,
    },
    RewardSeed {
        name: "Steam $10 Gift Card",
        description: "A $10 Steam gift card.",
        cost: 1000,
        kind: RewardKind::Digital,
        quantity: 50,
    },
    RewardSeed {
        name: "Epic Games $5 Credit",
        description: "Epic Games Store credit for games and DLC.",
        cost: 500,
        kind: RewardKind::Digital,
        quantity: 75,
    },
    RewardSeed {
        name: "Discord Nitro - 1 Month",
        description: "One month of Discord Nitro.",
        cost: 800,
        kind: RewardKind::Digital,
        quantity: 25,
    },
    RewardSeed {
        name: "GameQuestHub XL Mouse Pad",
        description: "Premium XL mouse pad with the GameQuestHub logo.",
        cost: 1200,
        kind: RewardKind::Physical,
        quantity: 20,
    },
    RewardSeed {
        name: "Pro Gaming Headset",
        description: "Noise-cancelling headset with a clear microphone.",
        cost: 5000,
        kind: RewardKind::Physical,
        quantity: 5,
    },
];

/// The sample quests. Creation times are staggered one minute apart so the
/// newest-first listing is deterministic.
pub fn sample_quests(now: DateTime<Utc>) -> StoreResult<Vec<Quest>> {
    QUESTS
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let input = NewQuest {
                title: seed.title.into(),
                description: seed.description.into(),
                platform: seed.platform,
                quest_type: seed.quest_type,
                difficulty: None,
                reward: seed.reward,
                verification: seed.verification,
                quest_url: seed.url.into(),
                validation_code: seed.code.map(Into::into),
                is_daily: seed.is_daily,
                is_new: seed.is_new,
                is_sponsored: seed.platform == Platform::Partner,
            };
            let created = now - Duration::minutes((QUESTS.len() - i) as i64);
            Quest::new(input, created).map_err(|e| StoreError::Conflict(e.to_string()))
        })
        .collect()
}

pub fn sample_rewards(now: DateTime<Utc>) -> StoreResult<Vec<Reward>> {
    REWARDS
        .iter()
        .map(|seed| {
            let input = NewReward {
                name: seed.name.into(),
                description: seed.description.into(),
                cost: seed.cost,
                image_url: None,
                kind: seed.kind,
                quantity: Some(seed.quantity),
            };
            Reward::new(input, now).map_err(|e| StoreError::Conflict(e.to_string()))
        })
        .collect()
}

/// Inserts the sample catalog. Returns the number of quests and rewards
/// written.
pub async fn load_catalog(
    quests: &dyn QuestCatalog,
    rewards: &dyn RewardCatalog,
    now: DateTime<Utc>,
) -> StoreResult<(usize, usize)> {
    let mut written = (0, 0);
    for quest in sample_quests(now)? {
        quests.insert_quest(quest).await?;
        written.0 += 1;
    }
    for reward in sample_rewards(now)? {
        rewards.insert_reward(reward).await?;
        written.1 += 1;
    }
    tracing::info!(quests = written.0, rewards = written.1, "sample catalog loaded");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryQuestCatalog, InMemoryRewardCatalog};
    use domains::Difficulty;

    #[test]
    fn sample_catalog_is_valid() {
        let quests = sample_quests(Utc::now()).unwrap();
        let watch = quests.iter().find(|q| q.requires_code()).unwrap();
        assert!(watch.is_daily);
        assert!(watch.accepts_code(Some(" gametip2024 ")));
        assert!(quests.iter().any(|q| q.difficulty == Difficulty::Hard));
        assert_eq!(sample_rewards(Utc::now()).unwrap().len(), REWARDS.len());
    }

    #[test]
    fn load_lists_newest_first() {
        let quests = InMemoryQuestCatalog::new();
        let rewards = InMemoryRewardCatalog::new();
        let (q, r) = tokio_test::block_on(load_catalog(&quests, &rewards, Utc::now())).unwrap();
        assert_eq!((q, r), (QUESTS.len(), REWARDS.len()));

        let listed = tokio_test::block_on(quests.list_quests()).unwrap();
        assert_eq!(listed[0].title, QUESTS[QUESTS.len() - 1].title);
    }
}
