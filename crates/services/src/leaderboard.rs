//! # Leaderboard
//!
//! Users ranked by point balance, highest first. Ties keep the order the
//! user store returns, which is registration order.

use std::sync::Arc;

use domains::{User, UserId, UserStore};
use serde::Serialize;

use crate::errors::ServiceError;
use crate::Ports;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    pub points: u64,
    pub level: u32,
}

fn ranked(mut users: Vec<User>) -> Vec<LeaderboardEntry> {
    users.sort_by(|a, b| b.points.cmp(&a.points));
    users
        .into_iter()
        .zip(1u32..)
        .map(|(user, rank)| LeaderboardEntry {
            rank,
            user_id: user.id,
            display_name: user.display_name,
            points: user.points,
            level: user.level,
        })
        .collect()
}

pub struct LeaderboardService {
    users: Arc<dyn UserStore>,
    default_limit: usize,
}

impl LeaderboardService {
    pub fn new(ports: &Ports, default_limit: usize) -> Self {
        Self {
            users: Arc::clone(&ports.users),
            default_limit,
        }
    }

    pub async fn top(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let limit = limit.unwrap_or(self.default_limit);
        let mut entries = ranked(self.users.list_users().await?);
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn rank_of(&self, user_id: UserId) -> Result<LeaderboardEntry, ServiceError> {
        ranked(self.users.list_users().await?)
            .into_iter()
            .find(|e| e.user_id == user_id)
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Utc;
    use domains::{
        MockActivityStore, MockProgressStore, MockQuestCatalog, MockRewardCatalog, MockSubmissionStore,
        MockUserStore, Role,
    };

    fn user(name: &str, points: u64) -> User {
        let mut u = User::new(name, Role::User, 500, Utc::now());
        u.points = points;
        u
    }

    #[test]
    fn ranks_by_points_with_stable_ties() {
        let entries = ranked(vec![user("ada", 100), user("bo", 900), user("cy", 100), user("di", 0)]);
        let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["bo", "ada", "cy", "di"]);
        let ranks: Vec<_> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, [1, 2, 3, 4]);
    }

    fn service(users: Vec<User>) -> LeaderboardService {
        let mut store = MockUserStore::new();
        store.expect_list_users().returning(move || Ok(users.clone()));
        let ports = Ports {
            quests: Arc::new(MockQuestCatalog::new()),
            progress: Arc::new(MockProgressStore::new()),
            submissions: Arc::new(MockSubmissionStore::new()),
            users: Arc::new(store),
            rewards: Arc::new(MockRewardCatalog::new()),
            activity: Arc::new(MockActivityStore::new()),
            clock: Arc::new(FixedClock::new(Utc::now())),
        };
        LeaderboardService::new(&ports, 2)
    }

    #[test]
    fn top_applies_the_default_limit() {
        let users = vec![user("ada", 100), user("bo", 900), user("cy", 300)];
        let cy = users[2].id;
        let service = service(users);

        let top = tokio_test::block_on(service.top(None)).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].display_name, "cy");
        assert_eq!(tokio_test::block_on(service.top(Some(10))).unwrap().len(), 3);

        let rank = tokio_test::block_on(service.rank_of(cy)).unwrap();
        assert_eq!(rank.rank, 2);
        assert!(tokio_test::block_on(service.rank_of(UserId::new())).is_err());
    }
}
