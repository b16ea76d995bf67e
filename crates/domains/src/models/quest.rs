//! Quest catalog entries.
//!
//! A `Quest` is a shared, read-only definition. Nothing a user does mutates
//! it; per-user state lives in [`crate::models::QuestProgress`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::QuestId;
use crate::errors::DomainError;

labelled_enum!(
    /// Where the quest takes place.
    Platform {
        YouTube => "YouTube",
        Twitter => "Twitter/X",
        Telegram => "Telegram",
        Instagram => "Instagram",
        Discord => "Discord",
        TikTok => "TikTok",
        Custom => "Custom URL",
        Partner => "Partner",
        Other => "Other",
    }
);

impl Platform {
    /// Platforms listed under the "Socials" tab. Everything except `Partner`.
    pub const SOCIAL: [Platform; 8] = [
        Platform::YouTube,
        Platform::Twitter,
        Platform::Telegram,
        Platform::Instagram,
        Platform::Discord,
        Platform::TikTok,
        Platform::Custom,
        Platform::Other,
    ];

    pub fn is_social(&self) -> bool {
        Self::SOCIAL.contains(self)
    }
}

labelled_enum!(
    /// What the user is asked to do.
    QuestType {
        Subscribe => "Subscribe",
        Like => "Like",
        Comment => "Comment",
        Watch => "Watch",
        Follow => "Follow",
        Retweet => "Retweet",
        QuoteTweet => "Quote Tweet",
        Join => "Join Channel/Group",
        Share => "Share",
        Visit => "Visit URL",
        Referral => "Referral",
    }
);

labelled_enum!(
    Difficulty {
        Easy => "Easy",
        Medium => "Medium",
        Hard => "Hard",
        Epic => "Epic",
    }
);

impl Difficulty {
    /// Difficulty implied by a point reward when the author does not pick one.
    pub fn for_reward(reward: u32) -> Self {
        match reward {
            r if r >= 300 => Difficulty::Hard,
            r if r >= 150 => Difficulty::Medium,
            _ => Difficulty::Easy,
        }
    }
}

labelled_enum!(
    /// How completion is established.
    VerificationType {
        /// An admin reviews submitted proof.
        Manual => "Manual",
        /// Granted on a client-side check (code match) or unconditionally.
        Automatic => "Automatic",
    }
);

labelled_enum!(
    /// Quest list tabs. Also the category set used for "new" badges.
    QuestFilter {
        All => "All",
        Daily => "Daily",
        Socials => "Socials",
        Sponsors => "Sponsors",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub platform: Platform,
    pub quest_type: QuestType,
    pub difficulty: Difficulty,
    /// Points granted on completion. Fixed at definition time.
    pub reward: u32,
    pub verification: VerificationType,
    pub quest_url: String,
    /// Code shown at the end of a Watch quest's video.
    pub validation_code: Option<String>,
    pub is_daily: bool,
    /// Catalog-level "freshly added" flag
    pub is_new: bool,
    pub is_sponsored: bool,
    /// Soft-delete marker; inactive quests are hidden from users.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin input for a new catalog quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub platform: Platform,
    pub quest_type: QuestType,
    /// Derived from `reward` when absent.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub reward: u32,
    pub verification: VerificationType,
    #[serde(default)]
    pub quest_url: String,
    #[serde(default)]
    pub validation_code: Option<String>,
    #[serde(default)]
    pub is_daily: bool,
    #[serde(default = "default_true")]
    pub is_new: bool,
    #[serde(default)]
    pub is_sponsored: bool,
}

fn default_true() -> bool {
    true
}

/// Partial update applied by an admin. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub platform: Option<Platform>,
    pub quest_type: Option<QuestType>,
    pub difficulty: Option<Difficulty>,
    pub reward: Option<u32>,
    pub verification: Option<VerificationType>,
    pub quest_url: Option<String>,
    pub validation_code: Option<String>,
    pub is_daily: Option<bool>,
    pub is_new: Option<bool>,
    pub is_sponsored: Option<bool>,
    pub is_active: Option<bool>,
}

impl Quest {
    pub fn new(input: NewQuest, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let quest = Quest {
            id: QuestId::new(),
            title: input.title.trim().to_string(),
            description: input.description,
            platform: input.platform,
            quest_type: input.quest_type,
            difficulty: input
                .difficulty
                .unwrap_or_else(|| Difficulty::for_reward(input.reward)),
            reward: input.reward,
            verification: input.verification,
            quest_url: input.quest_url,
            validation_code: normalize_code(input.validation_code),
            is_daily: input.is_daily,
            is_new: input.is_new,
            is_sponsored: input.is_sponsored,
            is_active: true,
            created_at,
        };
        quest.validate()?;
        Ok(quest)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("quest title must not be empty".into()));
        }
        if self.reward == 0 {
            return Err(DomainError::Validation("quest reward must be greater than zero".into()));
        }
        Ok(())
    }

    /// Applies an admin edit. The patch is validated as a whole; on error the
    /// quest is left unchanged.
    pub fn apply(&mut self, patch: QuestPatch) -> Result<(), DomainError> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(platform) = patch.platform {
            next.platform = platform;
        }
        if let Some(quest_type) = patch.quest_type {
            next.quest_type = quest_type;
        }
        if let Some(difficulty) = patch.difficulty {
            next.difficulty = difficulty;
        }
        if let Some(reward) = patch.reward {
            next.reward = reward;
        }
        if let Some(verification) = patch.verification {
            next.verification = verification;
        }
        if let Some(url) = patch.quest_url {
            next.quest_url = url;
        }
        if patch.validation_code.is_some() {
            next.validation_code = normalize_code(patch.validation_code);
        }
        if let Some(is_daily) = patch.is_daily {
            next.is_daily = is_daily;
        }
        if let Some(is_new) = patch.is_new {
            next.is_new = is_new;
        }
        if let Some(is_sponsored) = patch.is_sponsored {
            next.is_sponsored = is_sponsored;
        }
        if let Some(is_active) = patch.is_active {
            next.is_active = is_active;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Tab membership rule for the quest list.
    pub fn matches(&self, filter: QuestFilter) -> bool {
        match filter {
            QuestFilter::All => true,
            QuestFilter::Daily => self.is_daily,
            QuestFilter::Sponsors => self.platform == Platform::Partner,
            QuestFilter::Socials => self.platform.is_social(),
        }
    }

    /// Categories that light up when this quest is new. A daily social quest
    /// badges both "Daily" and "Socials".
    pub fn badge_categories(&self) -> Vec<QuestFilter> {
        let mut categories = Vec::with_capacity(2);
        if self.is_daily {
            categories.push(QuestFilter::Daily);
        }
        if self.platform == Platform::Partner {
            categories.push(QuestFilter::Sponsors);
        } else if self.platform.is_social() {
            categories.push(QuestFilter::Socials);
        }
        categories
    }

    /// Whether completion is gated on a watch code.
    pub fn requires_code(&self) -> bool {
        self.quest_type == QuestType::Watch && self.validation_code.is_some()
    }

    /// Case-insensitive comparison of a user-entered code. Quests without a
    /// code gate accept anything, including no input.
    pub fn accepts_code(&self, input: Option<&str>) -> bool {
        if !self.requires_code() {
            return true;
        }
        match (self.validation_code.as_deref(), input) {
            (Some(expected), Some(given)) => given.trim().eq_ignore_ascii_case(expected),
            _ => false,
        }
    }
}

fn normalize_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}
