//! # Reward redemption
//!
//! A per-user flow: `Idle -> Confirming -> Processing -> Success -> Idle`.
//! [`RedemptionFlow`] holds the state and enforces the transitions;
//! [`RedemptionService`] performs the external calls.
//!
//! Points are deducted exactly once, and only after the user confirms. A
//! failed, timed-out or abandoned commit leaves the balance and the stock
//! untouched and returns the flow to `Confirming` with the reason attached.

use std::sync::Arc;
use std::time::Duration;

use domains::{ActivityEntry, ActivityStore, Clock, Reward, RewardCatalog, RewardId, User, UserId, UserStore};
use serde::Serialize;
use tokio::time::Instant;

use crate::errors::RedemptionError;
use crate::Ports;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RedemptionState {
    #[default]
    Idle,
    Confirming {
        reward: Reward,
        /// Why the last confirm attempt failed, if it did
        failure: Option<String>,
    },
    Processing {
        reward: Reward,
    },
    Success {
        reward: Reward,
        entry: ActivityEntry,
        balance: u64,
    },
}

impl RedemptionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Confirming { .. } => "confirming",
            Self::Processing { .. } => "processing",
            Self::Success { .. } => "showing success",
        }
    }
}

/// State of one user's redemption dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedemptionFlow {
    state: RedemptionState,
}

impl RedemptionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RedemptionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RedemptionState::Idle
    }

    fn refuse(&self, action: &'static str) -> RedemptionError {
        let state = self.state.name();
        tracing::error!(state, action, "rejected redemption transition");
        RedemptionError::InvalidTransition { state, action }
    }

    /// Opens the confirmation step. The flow stays `Idle` if the user cannot
    /// afford the reward or the reward cannot be claimed.
    pub fn request_claim(&mut self, reward: Reward, user: &User) -> Result<(), RedemptionError> {
        if !self.is_idle() {
            return Err(self.refuse("request a claim"));
        }
        if !reward.is_active() {
            return Err(RedemptionError::RewardInactive(reward.name));
        }
        if !user.can_afford(reward.cost) {
            return Err(RedemptionError::InsufficientFunds {
                cost: reward.cost,
                available: user.points,
            });
        }
        if !reward.in_stock() {
            return Err(RedemptionError::OutOfStock(reward.name));
        }
        self.state = RedemptionState::Confirming { reward, failure: None };
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), RedemptionError> {
        match self.state {
            RedemptionState::Confirming { .. } => {
                self.state = RedemptionState::Idle;
                Ok(())
            }
            _ => Err(self.refuse("cancel")),
        }
    }

    pub fn dismiss_success(&mut self) -> Result<(), RedemptionError> {
        match self.state {
            RedemptionState::Success { .. } => {
                self.state = RedemptionState::Idle;
                Ok(())
            }
            _ => Err(self.refuse("dismiss")),
        }
    }

    fn begin_processing(&mut self) -> Result<Reward, RedemptionError> {
        match std::mem::take(&mut self.state) {
            RedemptionState::Confirming { reward, .. } => {
                self.state = RedemptionState::Processing { reward: reward.clone() };
                Ok(reward)
            }
            other => {
                self.state = other;
                Err(self.refuse("confirm"))
            }
        }
    }

    fn fail(&mut self, reward: Reward, reason: String) {
        self.state = RedemptionState::Confirming {
            reward,
            failure: Some(reason),
        };
    }

    fn succeed(&mut self, reward: Reward, entry: ActivityEntry, balance: u64) {
        self.state = RedemptionState::Success { reward, entry, balance };
    }
}

/// Holds a flow in `Processing` for the length of one commit. If the commit
/// future is dropped before it settles, the flow goes back to `Confirming`.
struct InFlight<'a> {
    flow: &'a mut RedemptionFlow,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let RedemptionState::Processing { reward } = &self.flow.state {
            tracing::warn!(reward_id = %reward.id, "claim abandoned while processing");
            let reward = reward.clone();
            self.flow.fail(reward, RedemptionError::Interrupted.user_message());
        }
    }
}

/// One unit of stock taken for a claim that has not settled yet. Unless it
/// is kept or given back explicitly, dropping it returns the unit on a
/// background task.
struct StockHold {
    rewards: Arc<dyn RewardCatalog>,
    reward_id: RewardId,
    settled: bool,
}

impl StockHold {
    fn new(rewards: &Arc<dyn RewardCatalog>, reward_id: RewardId) -> Self {
        Self {
            rewards: Arc::clone(rewards),
            reward_id,
            settled: false,
        }
    }

    fn keep(mut self) {
        self.settled = true;
    }

    async fn give_back(mut self) {
        self.settled = true;
        if let Err(err) = self.rewards.return_stock(self.reward_id).await {
            tracing::error!(reward_id = %self.reward_id, error = %err, "failed to return stock");
        }
    }
}

impl Drop for StockHold {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let rewards = Arc::clone(&self.rewards);
        let reward_id = self.reward_id;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::warn!(%reward_id, "claim abandoned after taking stock, returning it");
                runtime.spawn(async move {
                    if let Err(err) = rewards.return_stock(reward_id).await {
                        tracing::error!(%reward_id, error = %err, "failed to return stock");
                    }
                });
            }
            Err(_) => tracing::error!(%reward_id, "claim abandoned outside a runtime, stock not returned"),
        }
    }
}

/// Result of a committed claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimReceipt {
    pub reward_id: RewardId,
    pub cost: u64,
    pub balance: u64,
    /// `None` if the activity log could not be written
    pub entry: Option<ActivityEntry>,
}

pub struct RedemptionService {
    users: Arc<dyn UserStore>,
    rewards: Arc<dyn RewardCatalog>,
    activity: Arc<dyn ActivityStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl RedemptionService {
    pub fn new(ports: &Ports, timeout: Duration) -> Self {
        Self {
            users: Arc::clone(&ports.users),
            rewards: Arc::clone(&ports.rewards),
            activity: Arc::clone(&ports.activity),
            clock: Arc::clone(&ports.clock),
            timeout,
        }
    }

    /// Loads the user and reward and opens the confirmation step.
    pub async fn request_claim(
        &self,
        flow: &mut RedemptionFlow,
        user_id: UserId,
        reward_id: RewardId,
    ) -> Result<(), RedemptionError> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or(RedemptionError::UserNotFound(user_id))?;
        let reward = self
            .rewards
            .get_reward(reward_id)
            .await?
            .ok_or(RedemptionError::RewardNotFound(reward_id))?;

        flow.request_claim(reward, &user).inspect_err(|err| {
            tracing::warn!(%user_id, %reward_id, error = %err, "claim refused");
        })
    }

    /// Commits the claim the user is confirming. Bounded by the configured
    /// timeout; on any failure the flow goes back to `Confirming`, and so
    /// does a commit whose future is dropped midway.
    pub async fn confirm_claim(
        &self,
        flow: &mut RedemptionFlow,
        user_id: UserId,
    ) -> Result<ClaimReceipt, RedemptionError> {
        let reward = flow.begin_processing()?;
        let mut in_flight = InFlight { flow };

        let deadline = Instant::now() + self.timeout;
        match self.commit(user_id, &reward, deadline).await {
            Ok(user) => {
                let entry = ActivityEntry::reward_claimed(&reward.name, reward.cost, self.clock.now());
                // Points have moved; the flow must not fall back to Confirming from here.
                in_flight.flow.succeed(reward.clone(), entry.clone(), user.points);
                let logged = match self.activity.append(user_id, entry.clone()).await {
                    Ok(()) => Some(entry.clone()),
                    Err(err) => {
                        tracing::error!(%user_id, reward_id = %reward.id, error = %err,
                            "claim committed but activity entry not recorded");
                        None
                    }
                };
                tracing::info!(%user_id, reward_id = %reward.id, cost = reward.cost, balance = user.points,
                    "reward claimed");
                let receipt = ClaimReceipt {
                    reward_id: reward.id,
                    cost: reward.cost,
                    balance: user.points,
                    entry: logged,
                };
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(%user_id, reward_id = %reward.id, error = %err, "claim failed");
                let reward = match &err {
                    RedemptionError::PriceChanged { now, .. } => Reward { cost: *now, ..reward },
                    _ => reward,
                };
                in_flight.flow.fail(reward, err.user_message());
                Err(err)
            }
        }
    }

    /// Takes stock, then deducts points. The stock goes back whenever the
    /// deduction does not happen, including when the deadline passes first.
    async fn commit(&self, user_id: UserId, confirmed: &Reward, deadline: Instant) -> Result<User, RedemptionError> {
        let hold = tokio::time::timeout_at(deadline, self.reserve(confirmed))
            .await
            .unwrap_or(Err(RedemptionError::TimedOut))?;

        let delta = -i64::try_from(confirmed.cost).unwrap_or(i64::MAX);
        match tokio::time::timeout_at(deadline, self.users.adjust_points(user_id, delta)).await {
            Ok(Ok(user)) => {
                hold.keep();
                Ok(user)
            }
            Ok(Err(err)) => {
                hold.give_back().await;
                Err(err.into())
            }
            Err(_) => {
                hold.give_back().await;
                Err(RedemptionError::TimedOut)
            }
        }
    }

    /// Re-checks the reward against what the user confirmed and takes one
    /// unit of stock.
    async fn reserve(&self, confirmed: &Reward) -> Result<StockHold, RedemptionError> {
        let current = self
            .rewards
            .get_reward(confirmed.id)
            .await?
            .ok_or(RedemptionError::RewardNotFound(confirmed.id))?;
        if !current.is_active() {
            return Err(RedemptionError::RewardInactive(current.name));
        }
        if current.cost != confirmed.cost {
            return Err(RedemptionError::PriceChanged {
                was: confirmed.cost,
                now: current.cost,
            });
        }

        self.rewards.take_stock(current.id).await?;
        Ok(StockHold::new(&self.rewards, current.id))
    }
}
