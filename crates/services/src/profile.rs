//! # Profile
//!
//! Registration, profile edits, onboarding flags and the stats panel.

use std::sync::Arc;

use domains::{ActivityKind, ActivityStore, Clock, ProfilePatch, Role, User, UserId, UserStore};
use serde::Serialize;

use crate::errors::ServiceError;
use crate::Ports;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub quests_completed: usize,
    pub rewards_claimed: usize,
    /// Calendar days since registration, counting the first day
    pub days_active: i64,
}

pub struct ProfileService {
    users: Arc<dyn UserStore>,
    activity: Arc<dyn ActivityStore>,
    clock: Arc<dyn Clock>,
    xp_per_level: u32,
}

impl ProfileService {
    pub fn new(ports: &Ports, xp_per_level: u32) -> Self {
        Self {
            users: Arc::clone(&ports.users),
            activity: Arc::clone(&ports.activity),
            clock: Arc::clone(&ports.clock),
            xp_per_level,
        }
    }

    pub async fn register(&self, display_name: &str, role: Role) -> Result<User, ServiceError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(domains::DomainError::Validation("display name must not be empty".into()).into());
        }
        let user = self
            .users
            .create_user(User::new(name, role, self.xp_per_level, self.clock.now()))
            .await?;
        tracing::info!(user_id = %user.id, %role, "user registered");
        Ok(user)
    }

    /// Sign-up on behalf of `requester`. Anyone may create a player account;
    /// only an admin may create another admin.
    pub async fn create_account(
        &self,
        requester: Option<&User>,
        display_name: &str,
        role: Role,
    ) -> Result<User, ServiceError> {
        if role == Role::Admin && !requester.is_some_and(User::is_admin) {
            tracing::warn!(requester = ?requester.map(|u| u.id), "admin account requested without admin rights");
            return Err(ServiceError::Forbidden("create admin accounts"));
        }
        self.register(display_name, role).await
    }

    /// Returns an existing admin, or registers the first one under
    /// `display_name`.
    pub async fn ensure_admin(&self, display_name: &str) -> Result<User, ServiceError> {
        if let Some(admin) = self.users.list_users().await?.into_iter().find(User::is_admin) {
            return Ok(admin);
        }
        self.register(display_name, Role::Admin).await
    }

    pub async fn me(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }

    pub async fn update_profile(&self, user_id: UserId, patch: ProfilePatch) -> Result<User, ServiceError> {
        let mut user = self.me(user_id).await?;
        user.apply_profile(patch)?;
        Ok(self.users.save_profile(user).await?)
    }

    /// Marks the welcome screen as seen. Repeating it is harmless.
    pub async fn acknowledge_welcome(&self, user_id: UserId) -> Result<User, ServiceError> {
        let mut user = self.me(user_id).await?;
        if !user.onboarding.acknowledge_welcome() {
            return Ok(user);
        }
        Ok(self.users.save_profile(user).await?)
    }

    pub async fn register_email(&self, user_id: UserId, email: &str) -> Result<User, ServiceError> {
        let mut user = self.me(user_id).await?;
        let before = user.onboarding.registered_email.clone();
        user.onboarding.register_email(email)?;
        if user.onboarding.registered_email == before {
            return Ok(user);
        }
        Ok(self.users.save_profile(user).await?)
    }

    pub async fn stats(&self, user_id: UserId) -> Result<UserStats, ServiceError> {
        let user = self.me(user_id).await?;
        let log = self.activity.history(user_id).await?;
        let days = (self.clock.today() - user.created_at.date_naive()).num_days();
        Ok(UserStats {
            quests_completed: log.count(ActivityKind::Success),
            rewards_claimed: log.count(ActivityKind::Claim),
            days_active: days.max(0) + 1,
        })
    }
}
