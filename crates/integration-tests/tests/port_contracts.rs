//! Behaviour every store adapter must share. The checks take trait objects so
//! any adapter can be run through them; the in-memory adapters are run here.

use chrono::Utc;
use domains::{
    ActivityEntry, ActivityKind, ActivityStore, NewReward, QuestId, Reward, RewardCatalog, RewardKind,
    Role, StoreError, Submission, SubmissionReview, SubmissionStatus, SubmissionStore, User, UserId,
    UserStore,
};
use storage_adapters::memory::{
    InMemoryActivityStore, InMemoryRewardCatalog, InMemorySubmissionStore, InMemoryUserStore,
};

async fn points_never_go_negative(store: &dyn UserStore) {
    let user = store
        .create_user(User::new("Ada", Role::User, 500, Utc::now()))
        .await
        .unwrap();

    assert_eq!(store.adjust_points(user.id, 100).await.unwrap().points, 100);
    let err = store.adjust_points(user.id, -101).await.unwrap_err();
    assert!(matches!(err, StoreError::InsufficientFunds { required: 101, available: 100 }));
    assert_eq!(store.get_user(user.id).await.unwrap().unwrap().points, 100);
    assert_eq!(store.adjust_points(user.id, -100).await.unwrap().points, 0);

    let missing = store.adjust_points(UserId::new(), 5).await.unwrap_err();
    assert!(matches!(missing, StoreError::NotFound { .. }));
}

async fn stock_runs_out(catalog: &dyn RewardCatalog) {
    let input = NewReward {
        name: "Gaming Headset".into(),
        description: String::new(),
        cost: 5000,
        image_url: None,
        kind: RewardKind::Physical,
        quantity: Some(1),
    };
    let reward = catalog.insert_reward(Reward::new(input, Utc::now()).unwrap()).await.unwrap();

    let taken = catalog.take_stock(reward.id).await.unwrap();
    assert_eq!((taken.quantity, taken.claimed), (Some(0), 1));
    assert!(matches!(catalog.take_stock(reward.id).await, Err(StoreError::OutOfStock(_))));

    let returned = catalog.return_stock(reward.id).await.unwrap();
    assert_eq!((returned.quantity, returned.claimed), (Some(1), 0));
}

async fn submissions_are_decided_once(store: &dyn SubmissionStore) {
    let submission = store
        .record_submission(Submission::new(QuestId::new(), UserId::new(), "proof".into(), Utc::now()))
        .await
        .unwrap();
    let review = |status| SubmissionReview {
        reviewer: UserId::new(),
        status,
        note: None,
        reviewed_at: Utc::now(),
    };

    let approved = store
        .update_submission_status(submission.id, review(SubmissionStatus::Approved))
        .await
        .unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);

    let again = store
        .update_submission_status(submission.id, review(SubmissionStatus::Rejected))
        .await
        .unwrap_err();
    assert!(matches!(again, StoreError::Conflict(_)));
    assert!(store
        .list_submissions(Some(SubmissionStatus::Pending))
        .await
        .unwrap()
        .is_empty());
}

async fn activity_is_newest_first(store: &dyn ActivityStore) {
    let user = UserId::new();
    let now = Utc::now();
    store
        .append(user, ActivityEntry::quest_completed("Follow on TikTok", 100, now))
        .await
        .unwrap();
    store
        .append(user, ActivityEntry::reward_claimed("Steam $5 Gift Card", 500, now))
        .await
        .unwrap();

    let log = store.history(user).await.unwrap();
    let kinds: Vec<_> = log.entries().map(|e| e.kind).collect();
    assert_eq!(kinds, [ActivityKind::Claim, ActivityKind::Success]);
    assert!(store.history(UserId::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn in_memory_user_store() {
    points_never_go_negative(&InMemoryUserStore::new()).await;
}

#[tokio::test]
async fn in_memory_reward_catalog() {
    stock_runs_out(&InMemoryRewardCatalog::new()).await;
}

#[tokio::test]
async fn in_memory_submission_store() {
    submissions_are_decided_once(&InMemorySubmissionStore::new()).await;
}

#[tokio::test]
async fn in_memory_activity_store() {
    activity_is_newest_first(&InMemoryActivityStore::new()).await;
}
