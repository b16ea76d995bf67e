use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RewardId;
use crate::errors::DomainError;

labelled_enum!(
    RewardStatus {
        Active => "active",
        Inactive => "inactive",
    }
);

labelled_enum!(
    RewardKind {
        Digital => "digital",
        Physical => "physical",
        Voucher => "voucher",
        Cryptocurrency => "cryptocurrency",
    }
);

/// A catalog item redeemable for points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub name: String,
    pub description: String,
    pub cost: u64,
    pub image_url: Option<String>,
    pub status: RewardStatus,
    pub kind: RewardKind,
    /// Remaining stock; `None` means unlimited
    pub quantity: Option<u32>,
    pub claimed: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReward {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub kind: RewardKind,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cost: Option<u64>,
    pub image_url: Option<String>,
    pub status: Option<RewardStatus>,
    pub kind: Option<RewardKind>,
    pub quantity: Option<u32>,
}

impl Reward {
    pub fn new(input: NewReward, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let reward = Reward {
            id: RewardId::new(),
            name: input.name.trim().to_string(),
            description: input.description,
            cost: input.cost,
            image_url: input.image_url,
            status: RewardStatus::Active,
            kind: input.kind,
            quantity: input.quantity,
            claimed: 0,
            created_at,
        };
        reward.validate()?;
        Ok(reward)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("reward name must not be empty".into()));
        }
        if self.cost == 0 {
            return Err(DomainError::Validation("reward cost must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn apply(&mut self, patch: RewardPatch) -> Result<(), DomainError> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(cost) = patch.cost {
            next.cost = cost;
        }
        if patch.image_url.is_some() {
            next.image_url = patch.image_url;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if patch.quantity.is_some() {
            next.quantity = patch.quantity;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == RewardStatus::Active
    }

    pub fn in_stock(&self) -> bool {
        !matches!(self.quantity, Some(0))
    }

    /// Removes one unit of stock. False when tracked stock is exhausted.
    pub fn take_one(&mut self) -> bool {
        match self.quantity {
            Some(0) => return false,
            Some(q) => self.quantity = Some(q - 1),
            None => {}
        }
        self.claimed += 1;
        true
    }

    /// Undo of [`Reward::take_one`] for a claim that failed after stock was taken.
    pub fn return_one(&mut self) {
        if let Some(q) = self.quantity {
            self.quantity = Some(q + 1);
        }
        self.claimed = self.claimed.saturating_sub(1);
    }
}
