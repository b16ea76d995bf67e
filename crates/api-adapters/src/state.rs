//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use domains::UserId;
use services::{
    ActivityService, CatalogService, LeaderboardService, Ports, ProfileService, ProgressionRules,
    QuestService, RedemptionFlow, RedemptionService,
};
use tokio::sync::Mutex;

/// Tunables the services are built with.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub progression: ProgressionRules,
    pub xp_per_level: u32,
    pub claim_timeout: Duration,
    pub leaderboard_limit: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            progression: ProgressionRules::default(),
            xp_per_level: 500,
            claim_timeout: Duration::from_secs(10),
            leaderboard_limit: 10,
        }
    }
}

/// Services plus one redemption flow per user. A flow's mutex is held for
/// the whole confirm call, so a user cannot commit the same claim twice
/// concurrently.
pub struct AppState {
    pub quests: QuestService,
    pub redemption: RedemptionService,
    pub activity: ActivityService,
    pub catalog: CatalogService,
    pub profile: ProfileService,
    pub leaderboard: LeaderboardService,
    flows: DashMap<UserId, Arc<Mutex<RedemptionFlow>>>,
}

impl AppState {
    pub fn new(ports: &Ports, options: AppOptions) -> Self {
        Self {
            quests: QuestService::new(ports, options.progression),
            redemption: RedemptionService::new(ports, options.claim_timeout),
            activity: ActivityService::new(ports),
            catalog: CatalogService::new(ports),
            profile: ProfileService::new(ports, options.xp_per_level),
            leaderboard: LeaderboardService::new(ports, options.leaderboard_limit),
            flows: DashMap::new(),
        }
    }

    /// The user's redemption flow, created idle on first use.
    pub fn flow(&self, user_id: UserId) -> Arc<Mutex<RedemptionFlow>> {
        Arc::clone(&self.flows.entry(user_id).or_default())
    }
}
