//! services
//!
//! Use cases for QuestHub. Every service talks to storage through the port
//! traits in `domains`, so the same code runs against the in-memory adapters
//! and against Postgres.

use std::sync::Arc;

use domains::{ActivityStore, Clock, ProgressStore, QuestCatalog, RewardCatalog, SubmissionStore, UserStore};

pub mod activity;
pub mod catalog;
pub mod clock;
pub mod errors;
pub mod filters;
pub mod leaderboard;
pub mod profile;
pub mod quests;
pub mod redemption;

pub use activity::ActivityService;
pub use catalog::CatalogService;
pub use clock::{FixedClock, SystemClock};
pub use errors::{ErrorClass, QuestError, RedemptionError, ServiceError};
pub use filters::{derive_new_quest_info, filter_and_sort, resolve_filter, NewQuestInfo};
pub use leaderboard::{LeaderboardEntry, LeaderboardService};
pub use profile::{ProfileService, UserStats};
pub use quests::{
    Completion, ProgressionRules, QuestBoard, QuestCard, QuestDetail, QuestService, Resolution,
    ReviewDecision, ReviewItem, Selection,
};
pub use redemption::{ClaimReceipt, RedemptionFlow, RedemptionService, RedemptionState};

/// The set of collaborators every service draws from.
#[derive(Clone)]
pub struct Ports {
    pub quests: Arc<dyn QuestCatalog>,
    pub progress: Arc<dyn ProgressStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub users: Arc<dyn UserStore>,
    pub rewards: Arc<dyn RewardCatalog>,
    pub activity: Arc<dyn ActivityStore>,
    pub clock: Arc<dyn Clock>,
}
