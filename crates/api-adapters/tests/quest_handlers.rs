use std::sync::Arc;

use api_adapters::web::{router, USER_HEADER};
use api_adapters::{AppOptions, AppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use domains::{Role, User, UserId};
use serde_json::{json, Value};
use services::{FixedClock, Ports};
use storage_adapters::memory::{
    InMemoryActivityStore, InMemoryProgressStore, InMemoryQuestCatalog, InMemoryRewardCatalog,
    InMemorySubmissionStore, InMemoryUserStore,
};
use tower::ServiceExt;

struct Harness {
    app: Router,
    admin: User,
    player: User,
}

async fn harness() -> Harness {
    let ports = Ports {
        quests: Arc::new(InMemoryQuestCatalog::new()),
        progress: Arc::new(InMemoryProgressStore::new()),
        submissions: Arc::new(InMemorySubmissionStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
        rewards: Arc::new(InMemoryRewardCatalog::new()),
        activity: Arc::new(InMemoryActivityStore::new()),
        clock: Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())),
    };
    let state = Arc::new(AppState::new(&ports, AppOptions::default()));
    let admin = state.profile.register("Quest Master", Role::Admin).await.unwrap();
    let player = state.profile.register("Ada", Role::User).await.unwrap();
    Harness {
        app: router(state),
        admin,
        player,
    }
}

async fn send(app: &Router, method: Method, uri: &str, user: Option<UserId>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        req = req.header(USER_HEADER, id.to_string());
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_quest(h: &Harness, body: Value) -> String {
    let (status, quest) = send(&h.app, Method::POST, "/api/admin/quests", Some(h.admin.id), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{quest}");
    quest["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_a_known_user_are_unauthorized() {
    let h = harness().await;
    let (status, _) = send(&h.app, Method::GET, "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&h.app, Method::GET, "/api/me", Some(UserId::new()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&h.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn players_sign_up_and_admins_create_admins() {
    let h = harness().await;

    let (status, user) = send(&h.app, Method::POST, "/api/users", None, Some(json!({ "display_name": " Bo " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["display_name"], "Bo");
    assert_eq!(user["role"], "user");
    assert_eq!(user["points"], 0);

    let id: UserId = user["id"].as_str().unwrap().parse().unwrap();
    let (status, me) = send(&h.app, Method::GET, "/api/me", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["display_name"], "Bo");

    let (status, _) = send(&h.app, Method::POST, "/api/users", None, Some(json!({ "display_name": "  " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let admin_body = json!({ "display_name": "Moderator", "role": "admin" });
    let (status, _) = send(&h.app, Method::POST, "/api/users", None, Some(admin_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&h.app, Method::POST, "/api/users", Some(h.player.id), Some(admin_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&h.app, Method::POST, "/api/users", Some(UserId::new()), Some(admin_body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, moderator) = send(&h.app, Method::POST, "/api/users", Some(h.admin.id), Some(admin_body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(moderator["role"], "admin");
}

#[tokio::test]
async fn watch_quest_needs_the_code_and_pays_once() {
    let h = harness().await;
    let id = create_quest(
        &h,
        json!({
            "title": "Watch: Top 10 Gaming Tips",
            "platform": "YouTube",
            "quest_type": "Watch",
            "reward": 75,
            "verification": "Automatic",
            "quest_url": "https://youtube.com/watch?v=example123",
            "validation_code": "GAMETIP2024",
            "is_daily": true
        }),
    )
    .await;
    let me = Some(h.player.id);

    let (status, _) = send(&h.app, Method::POST, &format!("/api/quests/{id}/complete"), me, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT, "must open the quest first");

    let (status, selection) = send(&h.app, Method::POST, &format!("/api/quests/{id}/select"), me, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selection["outcome"], "opened");
    assert_eq!(selection["first_view"], true);

    let (status, body) = send(
        &h.app,
        Method::POST,
        &format!("/api/quests/{id}/complete"),
        me,
        Some(json!({ "code": "WRONG" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid code. Please try again.");

    let (status, completion) = send(
        &h.app,
        Method::POST,
        &format!("/api/quests/{id}/complete"),
        me,
        Some(json!({ "code": " gametip2024 " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completion["points_awarded"], 75);
    assert_eq!(completion["user"]["points"], 75);

    let (status, _) = send(
        &h.app,
        Method::POST,
        &format!("/api/quests/{id}/complete"),
        me,
        Some(json!({ "code": "GAMETIP2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, user) = send(&h.app, Method::GET, "/api/me", me, None).await;
    assert_eq!(user["points"], 75);

    let (_, selection) = send(&h.app, Method::POST, &format!("/api/quests/{id}/select"), me, None).await;
    assert_eq!(selection["outcome"], "locked");
}

#[tokio::test]
async fn manual_quest_review_round_trip() {
    let h = harness().await;
    let id = create_quest(
        &h,
        json!({
            "title": "Follow @GameQuestHub",
            "platform": "Twitter/X",
            "quest_type": "Follow",
            "reward": 80,
            "verification": "Manual"
        }),
    )
    .await;
    let me = Some(h.player.id);
    let admin = Some(h.admin.id);

    send(&h.app, Method::POST, &format!("/api/quests/{id}/select"), me, None).await;
    let (status, submission) = send(
        &h.app,
        Method::POST,
        &format!("/api/quests/{id}/submissions"),
        me,
        Some(json!({ "proof": "https://x.com/ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = submission["id"].as_str().unwrap().to_string();

    let (status, _) = send(&h.app, Method::GET, "/api/admin/submissions", me, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, queue) = send(&h.app, Method::GET, "/api/admin/submissions", admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().unwrap().len(), 1);
    assert_eq!(queue[0]["quest_title"], "Follow @GameQuestHub");
    assert_eq!(queue[0]["user_name"], "Ada");

    let (status, resolution) = send(
        &h.app,
        Method::POST,
        &format!("/api/admin/submissions/{submission_id}/resolve"),
        admin,
        Some(json!({ "decision": "rejected", "note": "Profile is private" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["decision"], "rejected");

    let (_, board) = send(&h.app, Method::GET, "/api/quests", me, None).await;
    assert_eq!(board["cards"][0]["state"], "rejected");

    let (status, resubmitted) = send(
        &h.app,
        Method::POST,
        &format!("/api/quests/{id}/submissions"),
        me,
        Some(json!({ "proof": "https://x.com/ada (now public)" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let resubmitted_id = resubmitted["id"].as_str().unwrap().to_string();

    let (status, resolution) = send(
        &h.app,
        Method::POST,
        &format!("/api/admin/submissions/{resubmitted_id}/resolve"),
        admin,
        Some(json!({ "decision": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["completion"]["user"]["points"], 80);

    let (status, _) = send(
        &h.app,
        Method::POST,
        &format!("/api/admin/submissions/{resubmitted_id}/resolve"),
        admin,
        Some(json!({ "decision": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, history) = send(&h.app, Method::GET, "/api/activity", me, None).await;
    let kinds: Vec<_> = history.as_array().unwrap().iter().map(|e| e["kind"].clone()).collect();
    assert_eq!(kinds, [json!("SUCCESS"), json!("FAILED")]);
}

#[tokio::test]
async fn claim_flow_deducts_on_confirm_only() {
    let h = harness().await;
    let me = Some(h.player.id);
    let (status, reward) = send(
        &h.app,
        Method::POST,
        "/api/admin/rewards",
        Some(h.admin.id),
        Some(json!({ "name": "Steam $5 Gift Card", "cost": 60, "kind": "digital", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reward_id = reward["id"].as_str().unwrap().to_string();

    let (status, body) = send(&h.app, Method::POST, &format!("/api/rewards/{reward_id}/claim"), me, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Insufficient points");
    let (_, flow) = send(&h.app, Method::GET, "/api/claim", me, None).await;
    assert_eq!(flow["state"], "idle");

    let quest = create_quest(
        &h,
        json!({
            "title": "Visit the GameQuestHub Blog",
            "platform": "Custom URL",
            "quest_type": "Visit URL",
            "reward": 100,
            "verification": "Automatic"
        }),
    )
    .await;
    send(&h.app, Method::POST, &format!("/api/quests/{quest}/select"), me, None).await;
    send(&h.app, Method::POST, &format!("/api/quests/{quest}/complete"), me, Some(json!({}))).await;

    let (status, flow) = send(&h.app, Method::POST, &format!("/api/rewards/{reward_id}/claim"), me, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flow["state"], "confirming");
    let (_, user) = send(&h.app, Method::GET, "/api/me", me, None).await;
    assert_eq!(user["points"], 100, "nothing is deducted before confirm");

    let (status, receipt) = send(&h.app, Method::POST, "/api/claim/confirm", me, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["balance"], 40);

    let (status, _) = send(&h.app, Method::POST, "/api/claim/confirm", me, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, claims) = send(&h.app, Method::GET, "/api/activity?kind=claim", me, None).await;
    assert_eq!(claims.as_array().unwrap().len(), 1);
    assert_eq!(claims[0]["points"], -60);

    let (status, flow) = send(&h.app, Method::POST, "/api/claim/dismiss", me, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flow["state"], "idle");

    let (_, rewards) = send(&h.app, Method::GET, "/api/rewards", me, None).await;
    assert_eq!(rewards[0]["quantity"], 0);
}

#[tokio::test]
async fn unknown_filter_falls_back_to_all() {
    let h = harness().await;
    create_quest(
        &h,
        json!({
            "title": "Join Telegram Gaming News",
            "platform": "Telegram",
            "quest_type": "Join Channel/Group",
            "reward": 150,
            "verification": "Manual"
        }),
    )
    .await;

    let (status, board) = send(&h.app, Method::GET, "/api/quests?filter=Legendary", Some(h.player.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["filter"], "All");
    assert_eq!(board["cards"].as_array().unwrap().len(), 1);
    assert_eq!(board["new_quests"]["count"], 1);
    assert_eq!(board["new_quests"]["categories"], json!(["Socials"]));
}
