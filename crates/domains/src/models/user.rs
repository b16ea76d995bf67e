//! Users and their progression.
//!
//! Points are a spendable balance; XP and level only ever grow. Spending
//! points never costs a level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use crate::errors::DomainError;

labelled_enum!(
    Role {
        User => "user",
        Admin => "admin",
    }
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHandles {
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub tiktok: Option<String>,
    pub discord: Option<String>,
    pub instagram: Option<String>,
}

/// First-run flags, persisted with the user rather than in ad hoc
/// client storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Onboarding {
    pub welcome_seen: bool,
    pub registered_email: Option<String>,
}

impl Onboarding {
    /// Returns true the first time only.
    pub fn acknowledge_welcome(&mut self) -> bool {
        !std::mem::replace(&mut self.welcome_seen, true)
    }

    /// Registering the same address again is a no-op; a different address
    /// is a conflict.
    pub fn register_email(&mut self, email: &str) -> Result<(), DomainError> {
        let email = email.trim().to_ascii_lowercase();
        let valid = matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(DomainError::Validation(format!("`{email}` is not an email address")));
        }
        match &self.registered_email {
            Some(existing) if *existing == email => Ok(()),
            Some(existing) => Err(DomainError::Conflict(format!(
                "email already registered as {existing}"
            ))),
            None => {
                self.registered_email = Some(email);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub points: u64,
    /// Progress toward the next level, always `< max_xp`
    pub xp: u32,
    /// Level threshold
    pub max_xp: u32,
    pub level: u32,
    pub quests_completed: u32,
    pub socials: SocialHandles,
    pub role: Role,
    pub onboarding: Onboarding,
    pub created_at: DateTime<Utc>,
}

/// Profile edit from the user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub tiktok: Option<String>,
    pub discord: Option<String>,
    pub instagram: Option<String>,
}

impl User {
    pub fn new(display_name: impl Into<String>, role: Role, max_xp: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            points: 0,
            xp: 0,
            max_xp: max_xp.max(1),
            level: 1,
            quests_completed: 0,
            socials: SocialHandles::default(),
            role,
            onboarding: Onboarding::default(),
            created_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.points >= cost
    }

    /// Balance after applying `delta`, or `None` if it would go negative.
    pub fn points_after(&self, delta: i64) -> Option<u64> {
        if delta >= 0 {
            self.points.checked_add(delta as u64)
        } else {
            self.points.checked_sub(delta.unsigned_abs())
        }
    }

    /// The single place point math happens. Leaves the balance untouched when
    /// the adjustment would overdraw.
    pub fn adjust_points(&mut self, delta: i64) -> Option<u64> {
        let next = self.points_after(delta)?;
        self.points = next;
        Some(next)
    }

    /// Adds XP, rolling over into levels. Returns the number of levels gained.
    pub fn gain_xp(&mut self, xp: u32) -> u32 {
        let mut gained = 0;
        self.xp = self.xp.saturating_add(xp);
        while self.xp >= self.max_xp {
            self.xp -= self.max_xp;
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// XP and quest counter side of a completion. Points are adjusted
    /// separately through [`User::adjust_points`].
    pub fn record_completion(&mut self, xp: u32, counts_toward_total: bool) -> u32 {
        if counts_toward_total {
            self.quests_completed += 1;
        }
        self.gain_xp(xp)
    }

    pub fn apply_profile(&mut self, patch: ProfilePatch) -> Result<(), DomainError> {
        if let Some(name) = &patch.display_name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation("display name must not be empty".into()));
            }
        }
        if let Some(name) = patch.display_name {
            self.display_name = name.trim().to_string();
        }
        let socials = &mut self.socials;
        for (slot, value) in [
            (&mut socials.telegram, patch.telegram),
            (&mut socials.twitter, patch.twitter),
            (&mut socials.tiktok, patch.tiktok),
            (&mut socials.discord, patch.discord),
            (&mut socials.instagram, patch.instagram),
        ] {
            if let Some(handle) = value {
                let handle = handle.trim().to_string();
                *slot = (!handle.is_empty()).then_some(handle);
            }
        }
        Ok(())
    }
}
