//! # Handlers
//!
//! Thin translation between HTTP and the services. No business rule lives
//! here; handlers parse, call one service method and serialize the result.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domains::{
    ActivityEntry, ActivityKind, NewQuest, NewReward, ProfilePatch, Quest, QuestId, QuestPatch,
    Reward, RewardId, RewardPatch, Role, Submission, SubmissionId, User,
};
use serde::Deserialize;
use serde_json::{json, Value};
use services::{
    resolve_filter, ClaimReceipt, Completion, LeaderboardEntry, QuestBoard, RedemptionState,
    Resolution, ReviewDecision, ReviewItem, Selection, ServiceError, UserStats,
};

use crate::state::AppState;
use crate::web::error::ApiResult;
use crate::web::extract::CurrentUser;

type AppData = State<Arc<AppState>>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── Profile ──

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub display_name: String,
    /// Defaults to `user`; `admin` needs an admin caller
    #[serde(default)]
    pub role: Option<Role>,
}

pub async fn register_user(
    State(state): AppData,
    requester: Option<CurrentUser>,
    Json(body): Json<SignUpBody>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let requester = requester.map(|CurrentUser(user)| user);
    let user = state
        .profile
        .create_account(requester.as_ref(), &body.display_name, body.role.unwrap_or(Role::User))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.profile.update_profile(user.id, patch).await?))
}

pub async fn acknowledge_welcome(State(state): AppData, CurrentUser(user): CurrentUser) -> ApiResult<Json<User>> {
    Ok(Json(state.profile.acknowledge_welcome(user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

pub async fn register_email(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Json(body): Json<EmailBody>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.profile.register_email(user.id, &body.email).await?))
}

pub async fn my_stats(State(state): AppData, CurrentUser(user): CurrentUser) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.profile.stats(user.id).await?))
}

// ── Quests ──

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub filter: Option<String>,
}

pub async fn quest_board(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BoardQuery>,
) -> ApiResult<Json<QuestBoard>> {
    let filter = resolve_filter(query.filter.as_deref());
    Ok(Json(state.quests.quest_board(user.id, filter).await?))
}

pub async fn select_quest(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Path(quest_id): Path<QuestId>,
) -> ApiResult<Json<Selection>> {
    Ok(Json(state.quests.select_quest(user.id, quest_id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteBody {
    #[serde(default)]
    pub code: Option<String>,
}

pub async fn complete_quest(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Path(quest_id): Path<QuestId>,
    Json(body): Json<CompleteBody>,
) -> ApiResult<Json<Completion>> {
    let completion = state
        .quests
        .complete_quest(user.id, quest_id, body.code.as_deref())
        .await?;
    Ok(Json(completion))
}

#[derive(Debug, Deserialize)]
pub struct ProofBody {
    pub proof: String,
}

pub async fn submit_proof(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Path(quest_id): Path<QuestId>,
    Json(body): Json<ProofBody>,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let submission = state.quests.submit_proof(user.id, quest_id, &body.proof).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

// ── Rewards ──

pub async fn list_rewards(State(state): AppData) -> ApiResult<Json<Vec<Reward>>> {
    Ok(Json(state.catalog.list_rewards().await?))
}

pub async fn request_claim(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Path(reward_id): Path<RewardId>,
) -> ApiResult<Json<RedemptionState>> {
    let flow = state.flow(user.id);
    let mut flow = flow.lock().await;
    state.redemption.request_claim(&mut flow, user.id, reward_id).await?;
    Ok(Json(flow.state().clone()))
}

pub async fn claim_state(State(state): AppData, CurrentUser(user): CurrentUser) -> Json<RedemptionState> {
    let flow = state.flow(user.id);
    let flow = flow.lock().await;
    Json(flow.state().clone())
}

pub async fn confirm_claim(State(state): AppData, CurrentUser(user): CurrentUser) -> ApiResult<Json<ClaimReceipt>> {
    let flow = state.flow(user.id);
    let mut flow = flow.lock().await;
    Ok(Json(state.redemption.confirm_claim(&mut flow, user.id).await?))
}

pub async fn cancel_claim(State(state): AppData, CurrentUser(user): CurrentUser) -> ApiResult<Json<RedemptionState>> {
    let flow = state.flow(user.id);
    let mut flow = flow.lock().await;
    flow.cancel()?;
    Ok(Json(flow.state().clone()))
}

pub async fn dismiss_claim(State(state): AppData, CurrentUser(user): CurrentUser) -> ApiResult<Json<RedemptionState>> {
    let flow = state.flow(user.id);
    let mut flow = flow.lock().await;
    flow.dismiss_success()?;
    Ok(Json(flow.state().clone()))
}

// ── Activity & leaderboard ──

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub kind: Option<String>,
}

pub async fn activity(
    State(state): AppData,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    let kind = match query.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) if raw.eq_ignore_ascii_case("all") => None,
        Some(raw) => Some(raw.parse::<ActivityKind>().map_err(ServiceError::from)?),
    };
    Ok(Json(state.activity.history(user.id, kind).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

pub async fn leaderboard(
    State(state): AppData,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(state.leaderboard.top(query.limit).await?))
}

pub async fn my_rank(State(state): AppData, CurrentUser(user): CurrentUser) -> ApiResult<Json<LeaderboardEntry>> {
    Ok(Json(state.leaderboard.rank_of(user.id).await?))
}

// ── Admin ──

#[derive(Debug, Default, Deserialize)]
pub struct QueueQuery {
    /// `pending` (default) or `processed`
    pub status: Option<String>,
}

pub async fn review_queue(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Query(query): Query<QueueQuery>,
) -> ApiResult<Json<Vec<ReviewItem>>> {
    let items = match query.status.as_deref() {
        Some("processed") => state.quests.processed_submissions(&admin).await?,
        _ => state.quests.pending_submissions(&admin).await?,
    };
    Ok(Json(items))
}

pub async fn resolve_submission(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Path(submission_id): Path<SubmissionId>,
    Json(decision): Json<ReviewDecision>,
) -> ApiResult<Json<Resolution>> {
    Ok(Json(state.quests.resolve_submission(&admin, submission_id, decision).await?))
}

pub async fn create_quest(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Json(input): Json<NewQuest>,
) -> ApiResult<(StatusCode, Json<Quest>)> {
    let quest = state.catalog.create_quest(&admin, input).await?;
    Ok((StatusCode::CREATED, Json(quest)))
}

pub async fn update_quest(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Path(quest_id): Path<QuestId>,
    Json(patch): Json<QuestPatch>,
) -> ApiResult<Json<Quest>> {
    Ok(Json(state.catalog.update_quest(&admin, quest_id, patch).await?))
}

pub async fn delete_quest(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Path(quest_id): Path<QuestId>,
) -> ApiResult<Json<Quest>> {
    Ok(Json(state.catalog.deactivate_quest(&admin, quest_id).await?))
}

pub async fn create_reward(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Json(input): Json<NewReward>,
) -> ApiResult<(StatusCode, Json<Reward>)> {
    let reward = state.catalog.create_reward(&admin, input).await?;
    Ok((StatusCode::CREATED, Json(reward)))
}

pub async fn update_reward(
    State(state): AppData,
    CurrentUser(admin): CurrentUser,
    Path(reward_id): Path<RewardId>,
    Json(patch): Json<RewardPatch>,
) -> ApiResult<Json<Reward>> {
    Ok(Json(state.catalog.update_reward(&admin, reward_id, patch).await?))
}
