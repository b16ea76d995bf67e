//! # Quest lifecycle
//!
//! Moves one user's progress on one quest through
//! `Available -> Viewed -> (Pending -> Rejected)* -> Locked`.
//! Automatic quests lock on `complete_quest`; Manual quests lock when an
//! admin approves the submitted proof. Daily quests reopen on the next
//! calendar day without any scheduler.
//!
//! Completion always locks the quest before points move, so a retried or
//! duplicated completion can never pay out twice.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use domains::{
    ActivityEntry, ActivityStore, Clock, ProgressStore, Quest, QuestCatalog, QuestFilter, QuestId,
    QuestProgress, QuestState, Submission, SubmissionId, SubmissionReview, SubmissionStatus,
    SubmissionStore, User, UserId, UserStore, VerificationType,
};
use serde::{Deserialize, Serialize};

use crate::errors::QuestError;
use crate::filters::{derive_new_quest_info, filter_and_sort, NewQuestInfo};
use crate::Ports;

/// How quest rewards translate into XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionRules {
    /// Share of the point reward granted as XP
    pub xp_reward_percent: u32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self { xp_reward_percent: 50 }
    }
}

impl ProgressionRules {
    pub fn xp_for(&self, reward: u32) -> u32 {
        let xp = u64::from(reward) * u64::from(self.xp_reward_percent) / 100;
        u32::try_from(xp).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestDetail {
    pub quest: Quest,
    pub state: QuestState,
    /// True when this selection was the user's first look at the quest
    pub first_view: bool,
    pub rejection_note: Option<String>,
}

/// Outcome of opening a quest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Selection {
    Opened(QuestDetail),
    /// Already completed for the current cycle; nothing happened
    Locked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub quest_id: QuestId,
    pub points_awarded: u32,
    pub xp_awarded: u32,
    pub levels_gained: u32,
    /// The user after points and progression were applied
    pub user: User,
    /// `None` if the activity log could not be written
    pub entry: Option<ActivityEntry>,
}

/// An admin's verdict on a pending submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected {
        #[serde(default)]
        note: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Resolution {
    Approved {
        submission: Submission,
        completion: Completion,
    },
    Rejected {
        submission: Submission,
        entry: Option<ActivityEntry>,
    },
}

/// A submission with enough context for a reviewer to act on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub submission: Submission,
    pub quest_title: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestCard {
    pub quest: Quest,
    pub state: QuestState,
    pub is_new: bool,
}

/// Everything the quest list needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestBoard {
    pub filter: QuestFilter,
    pub cards: Vec<QuestCard>,
    pub new_quests: NewQuestInfo,
}

fn rejected_transition(quest_id: QuestId, user_id: UserId, reason: &'static str) -> QuestError {
    tracing::error!(%quest_id, %user_id, reason, "rejected quest transition");
    QuestError::InvalidTransition(reason.to_string())
}

pub struct QuestService {
    quests: Arc<dyn QuestCatalog>,
    progress: Arc<dyn ProgressStore>,
    submissions: Arc<dyn SubmissionStore>,
    users: Arc<dyn UserStore>,
    activity: Arc<dyn ActivityStore>,
    clock: Arc<dyn Clock>,
    rules: ProgressionRules,
}

impl QuestService {
    pub fn new(ports: &Ports, rules: ProgressionRules) -> Self {
        Self {
            quests: Arc::clone(&ports.quests),
            progress: Arc::clone(&ports.progress),
            submissions: Arc::clone(&ports.submissions),
            users: Arc::clone(&ports.users),
            activity: Arc::clone(&ports.activity),
            clock: Arc::clone(&ports.clock),
            rules,
        }
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<User, QuestError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(QuestError::UserNotFound(user_id))
    }

    async fn active_quest(&self, quest_id: QuestId) -> Result<Quest, QuestError> {
        match self.quests.get_quest(quest_id).await? {
            Some(quest) if quest.is_active => Ok(quest),
            _ => Err(QuestError::QuestNotFound(quest_id)),
        }
    }

    async fn progress_for(&self, user_id: UserId, quest_id: QuestId) -> Result<QuestProgress, QuestError> {
        let existing = self.progress.get_progress(user_id, quest_id).await?;
        Ok(existing.unwrap_or_else(|| QuestProgress::new(user_id, quest_id, self.clock.now())))
    }

    /// Opens a quest for the user. Marks it viewed on first open and
    /// restarts a daily quest left over from an earlier day. Selecting a
    /// quest that is locked for this cycle changes nothing.
    pub async fn select_quest(&self, user_id: UserId, quest_id: QuestId) -> Result<Selection, QuestError> {
        self.ensure_user(user_id).await?;
        let quest = self.active_quest(quest_id).await?;
        let today = self.clock.today();
        let mut progress = self.progress_for(user_id, quest_id).await?;

        if progress.is_locked(&quest, today) {
            tracing::debug!(%quest_id, %user_id, "quest already completed for this cycle");
            return Ok(Selection::Locked);
        }

        let rolled = progress.roll_daily_cycle(&quest, today);
        let first_view = progress.mark_viewed(self.clock.now());
        if rolled || first_view {
            self.progress.save_progress(progress.clone()).await?;
        }

        Ok(Selection::Opened(QuestDetail {
            state: progress.state(&quest, today),
            rejection_note: progress.rejection_note.clone(),
            first_view,
            quest,
        }))
    }

    /// Completes an Automatic quest. Watch quests with a validation code
    /// require a matching `code`.
    pub async fn complete_quest(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        code: Option<&str>,
    ) -> Result<Completion, QuestError> {
        self.ensure_user(user_id).await?;
        let quest = self.active_quest(quest_id).await?;
        if quest.verification != VerificationType::Automatic {
            return Err(rejected_transition(quest_id, user_id, "manual quests are completed through review"));
        }

        let today = self.clock.today();
        let mut progress = self.progress_for(user_id, quest_id).await?;
        if progress.is_locked(&quest, today) {
            return Err(rejected_transition(quest_id, user_id, "quest already completed for this cycle"));
        }
        progress.roll_daily_cycle(&quest, today);
        if !progress.viewed {
            return Err(rejected_transition(quest_id, user_id, "quest must be opened before it is completed"));
        }
        if !quest.accepts_code(code) {
            tracing::warn!(%quest_id, %user_id, "invalid watch code");
            return Err(QuestError::InvalidCode);
        }

        self.apply_completion(user_id, &quest, progress, false).await
    }

    /// Records proof for a Manual quest and moves it to Pending.
    pub async fn submit_proof(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        proof: &str,
    ) -> Result<Submission, QuestError> {
        self.ensure_user(user_id).await?;
        let quest = self.active_quest(quest_id).await?;
        if quest.verification != VerificationType::Manual {
            return Err(rejected_transition(quest_id, user_id, "automatic quests do not take proof"));
        }

        let today = self.clock.today();
        let now = self.clock.now();
        let mut progress = self.progress_for(user_id, quest_id).await?;
        if progress.is_locked(&quest, today) {
            return Err(rejected_transition(quest_id, user_id, "quest already completed for this cycle"));
        }
        progress.roll_daily_cycle(&quest, today);
        if progress.submission_status == Some(SubmissionStatus::Pending) {
            return Err(rejected_transition(quest_id, user_id, "a submission is already awaiting review"));
        }
        if !progress.viewed {
            return Err(rejected_transition(quest_id, user_id, "quest must be opened before proof is submitted"));
        }

        let proof = proof.trim();
        if proof.is_empty() {
            tracing::warn!(%quest_id, %user_id, "empty proof submitted");
            return Err(QuestError::EmptyProof);
        }

        let submission = self
            .submissions
            .record_submission(Submission::new(quest_id, user_id, proof.to_string(), now))
            .await?;

        progress.mark_pending(now);
        if let Err(err) = self.progress.save_progress(progress).await {
            tracing::error!(%quest_id, %user_id, submission_id = %submission.id, error = %err,
                "submission recorded but progress was not updated");
            return Err(err.into());
        }

        tracing::info!(%quest_id, %user_id, submission_id = %submission.id, "proof submitted for review");
        Ok(submission)
    }

    /// Applies an admin decision to a pending submission. Approval pays out
    /// exactly like an automatic completion.
    pub async fn resolve_submission(
        &self,
        reviewer: &User,
        submission_id: SubmissionId,
        decision: ReviewDecision,
    ) -> Result<Resolution, QuestError> {
        if !reviewer.is_admin() {
            tracing::warn!(user_id = %reviewer.id, %submission_id, "non-admin tried to review a submission");
            return Err(QuestError::Forbidden("review submissions"));
        }

        let pending = self
            .submissions
            .get_submission(submission_id)
            .await?
            .ok_or(QuestError::SubmissionNotFound(submission_id))?;
        let (quest_id, user_id) = (pending.quest_id, pending.user_id);
        if pending.status != SubmissionStatus::Pending {
            return Err(rejected_transition(quest_id, user_id, "submission already reviewed"));
        }

        let quest = self
            .quests
            .get_quest(quest_id)
            .await?
            .ok_or(QuestError::QuestNotFound(quest_id))?;
        let today = self.clock.today();
        let now = self.clock.now();
        let mut progress = self.progress_for(user_id, quest_id).await?;
        progress.roll_daily_cycle(&quest, today);

        let review = |status, note| SubmissionReview {
            reviewer: reviewer.id,
            status,
            note,
            reviewed_at: now,
        };

        match decision {
            ReviewDecision::Approved => {
                if progress.is_locked(&quest, today) {
                    return Err(rejected_transition(quest_id, user_id, "quest already completed for this cycle"));
                }
                let submission = self
                    .submissions
                    .update_submission_status(submission_id, review(SubmissionStatus::Approved, None))
                    .await?;
                let completion = match self.apply_completion(user_id, &quest, progress, true).await {
                    Ok(completion) => completion,
                    Err(err) => {
                        tracing::error!(%submission_id, %user_id, error = %err,
                            "approved submission could not be credited");
                        self.reopen(submission_id).await;
                        return Err(err);
                    }
                };
                Ok(Resolution::Approved { submission, completion })
            }
            ReviewDecision::Rejected { note } => {
                let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
                let submission = self
                    .submissions
                    .update_submission_status(submission_id, review(SubmissionStatus::Rejected, note.clone()))
                    .await?;

                progress.mark_rejected(note, now);
                if let Err(err) = self.progress.save_progress(progress).await {
                    tracing::error!(%submission_id, %user_id, error = %err,
                        "rejection could not be recorded on the quest");
                    self.reopen(submission_id).await;
                    return Err(err.into());
                }

                let entry = self
                    .log_activity(user_id, ActivityEntry::submission_rejected(&quest.title, now))
                    .await;
                tracing::info!(%submission_id, %quest_id, %user_id, reviewer = %reviewer.id, "submission rejected");
                Ok(Resolution::Rejected { submission, entry })
            }
        }
    }

    /// Puts a submission back in the review queue after its decision could
    /// not be carried through.
    async fn reopen(&self, submission_id: SubmissionId) {
        match self.submissions.reopen_submission(submission_id).await {
            Ok(_) => tracing::info!(%submission_id, "submission returned to the review queue"),
            Err(err) => tracing::error!(%submission_id, error = %err, "failed to reopen submission"),
        }
    }

    /// Locks the quest, then credits points, then progression, then logs.
    /// If the points cannot be credited the lock is rolled back.
    async fn apply_completion(
        &self,
        user_id: UserId,
        quest: &Quest,
        mut progress: QuestProgress,
        approved: bool,
    ) -> Result<Completion, QuestError> {
        let now = self.clock.now();
        let today = self.clock.today();
        let before = progress.clone();

        progress.mark_completed(quest, today, now, approved);
        self.progress.save_progress(progress).await?;

        let credited = match self.users.adjust_points(user_id, i64::from(quest.reward)).await {
            Ok(user) => user,
            Err(err) => {
                if let Err(undo) = self.progress.save_progress(before).await {
                    tracing::error!(%user_id, quest_id = %quest.id, error = %undo,
                        "failed to reopen quest after points were not credited");
                }
                return Err(err.into());
            }
        };

        let xp = self.rules.xp_for(quest.reward);
        let user = match self.users.record_progression(user_id, xp, !quest.is_daily).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(%user_id, quest_id = %quest.id, error = %err,
                    "progression not recorded, points already credited");
                credited.clone()
            }
        };
        let levels_gained = user.level.saturating_sub(credited.level);
        if levels_gained > 0 {
            tracing::info!(%user_id, level = user.level, "level up");
        }

        let entry = self
            .log_activity(user_id, ActivityEntry::quest_completed(&quest.title, quest.reward, now))
            .await;
        tracing::info!(%user_id, quest_id = %quest.id, points = quest.reward, balance = user.points,
            "quest completed");

        Ok(Completion {
            quest_id: quest.id,
            points_awarded: quest.reward,
            xp_awarded: xp,
            levels_gained,
            user,
            entry,
        })
    }

    async fn log_activity(&self, user_id: UserId, entry: ActivityEntry) -> Option<ActivityEntry> {
        match self.activity.append(user_id, entry.clone()).await {
            Ok(()) => Some(entry),
            Err(err) => {
                tracing::error!(%user_id, kind = %entry.kind, error = %err, "activity entry not recorded");
                None
            }
        }
    }

    /// The quest list for one user: filtered cards plus new-quest badges.
    pub async fn quest_board(&self, user_id: UserId, filter: QuestFilter) -> Result<QuestBoard, QuestError> {
        let quests = self.quests.list_quests().await?;
        let today = self.clock.today();
        let progress: HashMap<QuestId, QuestProgress> = self
            .progress
            .list_progress(user_id)
            .await?
            .into_iter()
            .map(|p| (p.quest_id, p))
            .collect();

        let viewed: HashSet<QuestId> = progress.values().filter(|p| p.viewed).map(|p| p.quest_id).collect();
        let completed: HashSet<QuestId> = quests
            .iter()
            .filter(|q| progress.get(&q.id).is_some_and(|p| p.is_locked(q, today)))
            .map(|q| q.id)
            .collect();

        let new_quests = derive_new_quest_info(&quests, &viewed, &completed);
        let cards = filter_and_sort(&quests, filter, &completed)
            .into_iter()
            .map(|quest| QuestCard {
                state: progress
                    .get(&quest.id)
                    .map_or(QuestState::Available, |p| p.state(quest, today)),
                is_new: quest.is_new && !viewed.contains(&quest.id),
                quest: quest.clone(),
            })
            .collect();

        Ok(QuestBoard {
            filter,
            cards,
            new_quests,
        })
    }

    /// Submissions awaiting a decision, newest first.
    pub async fn pending_submissions(&self, reviewer: &User) -> Result<Vec<ReviewItem>, QuestError> {
        self.review_queue(reviewer, |status| status == SubmissionStatus::Pending).await
    }

    /// Approved and rejected submissions, newest first.
    pub async fn processed_submissions(&self, reviewer: &User) -> Result<Vec<ReviewItem>, QuestError> {
        self.review_queue(reviewer, |status| status != SubmissionStatus::Pending).await
    }

    async fn review_queue(
        &self,
        reviewer: &User,
        keep: impl Fn(SubmissionStatus) -> bool,
    ) -> Result<Vec<ReviewItem>, QuestError> {
        if !reviewer.is_admin() {
            return Err(QuestError::Forbidden("view the verification queue"));
        }

        let submissions = self.submissions.list_submissions(None).await?;
        let mut titles: HashMap<QuestId, Option<String>> = HashMap::new();
        let mut names: HashMap<UserId, Option<String>> = HashMap::new();
        let mut items = Vec::new();

        for submission in submissions.into_iter().filter(|s| keep(s.status)) {
            if !titles.contains_key(&submission.quest_id) {
                let title = self.quests.get_quest(submission.quest_id).await?.map(|q| q.title);
                titles.insert(submission.quest_id, title);
            }
            if !names.contains_key(&submission.user_id) {
                let name = self.users.get_user(submission.user_id).await?.map(|u| u.display_name);
                names.insert(submission.user_id, name);
            }
            items.push(ReviewItem {
                quest_title: titles.get(&submission.quest_id).cloned().flatten(),
                user_name: names.get(&submission.user_id).cloned().flatten(),
                submission,
            });
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::errors::ErrorClass;
    use chrono::{NaiveDate, Utc};
    use domains::{
        MockActivityStore, MockProgressStore, MockQuestCatalog, MockRewardCatalog, MockSubmissionStore,
        MockUserStore, NewQuest, Platform, QuestType, Role, StoreError,
    };

    fn quest(verification: VerificationType) -> Quest {
        Quest::new(
            NewQuest {
                title: "Follow @GameQuestHub".into(),
                description: String::new(),
                platform: Platform::Twitter,
                quest_type: QuestType::Follow,
                difficulty: None,
                reward: 100,
                verification,
                quest_url: "https://x.com/gamequesthub".into(),
                validation_code: None,
                is_daily: false,
                is_new: true,
                is_sponsored: false,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn user(role: Role) -> User {
        User::new("Ada", role, 500, Utc::now())
    }

    struct Mocks {
        quests: MockQuestCatalog,
        progress: MockProgressStore,
        submissions: MockSubmissionStore,
        users: MockUserStore,
        activity: MockActivityStore,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                quests: MockQuestCatalog::new(),
                progress: MockProgressStore::new(),
                submissions: MockSubmissionStore::new(),
                users: MockUserStore::new(),
                activity: MockActivityStore::new(),
            }
        }

        fn service(self) -> QuestService {
            let ports = Ports {
                quests: Arc::new(self.quests),
                progress: Arc::new(self.progress),
                submissions: Arc::new(self.submissions),
                users: Arc::new(self.users),
                rewards: Arc::new(MockRewardCatalog::new()),
                activity: Arc::new(self.activity),
                clock: Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())),
            };
            QuestService::new(&ports, ProgressionRules::default())
        }

        fn with_user(mut self, u: &User) -> Self {
            let u = u.clone();
            self.users.expect_get_user().returning(move |_| Ok(Some(u.clone())));
            self
        }

        fn with_quest(mut self, q: &Quest) -> Self {
            let q = q.clone();
            self.quests.expect_get_quest().returning(move |_| Ok(Some(q.clone())));
            self
        }
    }

    fn viewed(user: &User, quest: &Quest) -> QuestProgress {
        let mut progress = QuestProgress::new(user.id, quest.id, Utc::now());
        progress.mark_viewed(Utc::now());
        progress
    }

    #[test]
    fn xp_is_a_share_of_the_reward() {
        let rules = ProgressionRules::default();
        assert_eq!(rules.xp_for(100), 50);
        assert_eq!(rules.xp_for(75), 37);
        assert_eq!(ProgressionRules { xp_reward_percent: 100 }.xp_for(80), 80);
    }

    #[tokio::test]
    async fn failed_credit_reopens_the_quest_and_logs_nothing() {
        let u = user(Role::User);
        let q = quest(VerificationType::Automatic);
        let progress = viewed(&u, &q);

        let mut mocks = Mocks::new().with_user(&u).with_quest(&q);
        mocks
            .progress
            .expect_get_progress()
            .returning(move |_, _| Ok(Some(progress.clone())));
        let mut seq = mockall::Sequence::new();
        mocks
            .progress
            .expect_save_progress()
            .withf(|p| p.completed)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mocks
            .progress
            .expect_save_progress()
            .withf(|p| !p.completed)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mocks
            .users
            .expect_adjust_points()
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("connection reset".into())));
        mocks.activity.expect_append().never();

        let err = mocks.service().complete_quest(u.id, q.id, None).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::External);
    }

    #[tokio::test]
    async fn completing_a_locked_quest_is_an_invalid_transition() {
        let u = user(Role::User);
        let q = quest(VerificationType::Automatic);
        let mut progress = viewed(&u, &q);
        progress.completed = true;

        let mut mocks = Mocks::new().with_user(&u).with_quest(&q);
        mocks
            .progress
            .expect_get_progress()
            .returning(move |_, _| Ok(Some(progress.clone())));
        mocks.progress.expect_save_progress().never();
        mocks.users.expect_adjust_points().never();

        let err = mocks.service().complete_quest(u.id, q.id, None).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidTransition);
    }

    #[tokio::test]
    async fn failed_submission_leaves_progress_untouched() {
        let u = user(Role::User);
        let q = quest(VerificationType::Manual);
        let progress = viewed(&u, &q);

        let mut mocks = Mocks::new().with_user(&u).with_quest(&q);
        mocks
            .progress
            .expect_get_progress()
            .returning(move |_, _| Ok(Some(progress.clone())));
        mocks
            .submissions
            .expect_record_submission()
            .returning(|_| Err(StoreError::Unavailable("timeout".into())));
        mocks.progress.expect_save_progress().never();

        let err = mocks
            .service()
            .submit_proof(u.id, q.id, "https://x.com/ada/status/1")
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::External);
    }

    #[tokio::test]
    async fn blank_proof_is_refused_before_any_write() {
        let u = user(Role::User);
        let q = quest(VerificationType::Manual);
        let progress = viewed(&u, &q);

        let mut mocks = Mocks::new().with_user(&u).with_quest(&q);
        mocks
            .progress
            .expect_get_progress()
            .returning(move |_, _| Ok(Some(progress.clone())));
        mocks.submissions.expect_record_submission().never();

        let err = mocks.service().submit_proof(u.id, q.id, "   ").await.unwrap_err();
        assert!(matches!(err, QuestError::EmptyProof));
    }

    fn awaiting_review(u: &User, q: &Quest) -> (Submission, QuestProgress) {
        let mut progress = viewed(u, q);
        progress.mark_pending(Utc::now());
        let submission = Submission::new(q.id, u.id, "https://x.com/ada".into(), Utc::now());
        (submission, progress)
    }

    fn decided(submission: &Submission, status: SubmissionStatus) -> Submission {
        let mut decided = submission.clone();
        decided.status = status;
        decided
    }

    #[tokio::test]
    async fn approval_that_cannot_be_credited_goes_back_to_the_queue() {
        let admin = user(Role::Admin);
        let u = user(Role::User);
        let q = quest(VerificationType::Manual);
        let (submission, progress) = awaiting_review(&u, &q);

        let mut mocks = Mocks::new().with_quest(&q);
        let pending = submission.clone();
        mocks
            .submissions
            .expect_get_submission()
            .returning(move |_| Ok(Some(pending.clone())));
        let approved = decided(&submission, SubmissionStatus::Approved);
        mocks
            .submissions
            .expect_update_submission_status()
            .times(1)
            .returning(move |_, _| Ok(approved.clone()));
        let reopened = submission.clone();
        mocks
            .submissions
            .expect_reopen_submission()
            .withf(move |id| *id == reopened.id)
            .times(1)
            .returning(move |_| Ok(submission.clone()));
        mocks
            .progress
            .expect_get_progress()
            .returning(move |_, _| Ok(Some(progress.clone())));
        mocks.progress.expect_save_progress().times(2).returning(|_| Ok(()));
        mocks
            .users
            .expect_adjust_points()
            .returning(|_, _| Err(StoreError::Unavailable("connection reset".into())));
        mocks.activity.expect_append().never();

        let err = mocks
            .service()
            .resolve_submission(&admin, SubmissionId::new(), ReviewDecision::Approved)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::External);
    }

    #[tokio::test]
    async fn rejection_that_cannot_be_saved_goes_back_to_the_queue() {
        let admin = user(Role::Admin);
        let u = user(Role::User);
        let q = quest(VerificationType::Manual);
        let (submission, progress) = awaiting_review(&u, &q);

        let mut mocks = Mocks::new().with_quest(&q);
        let pending = submission.clone();
        mocks
            .submissions
            .expect_get_submission()
            .returning(move |_| Ok(Some(pending.clone())));
        let rejected = decided(&submission, SubmissionStatus::Rejected);
        mocks
            .submissions
            .expect_update_submission_status()
            .times(1)
            .returning(move |_, _| Ok(rejected.clone()));
        mocks
            .submissions
            .expect_reopen_submission()
            .times(1)
            .returning(move |_| Ok(submission.clone()));
        mocks
            .progress
            .expect_get_progress()
            .returning(move |_, _| Ok(Some(progress.clone())));
        mocks
            .progress
            .expect_save_progress()
            .returning(|_| Err(StoreError::Unavailable("disk full".into())));
        mocks.activity.expect_append().never();

        let err = mocks
            .service()
            .resolve_submission(
                &admin,
                SubmissionId::new(),
                ReviewDecision::Rejected {
                    note: Some("Profile is private".into()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::External);
    }

    #[tokio::test]
    async fn only_admins_review() {
        let service = Mocks::new().service();
        let err = service
            .resolve_submission(&user(Role::User), SubmissionId::new(), ReviewDecision::Approved)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Forbidden);

        let err = service.pending_submissions(&user(Role::User)).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Forbidden);
    }

    #[test]
    fn review_decision_wire_format() {
        let rejected: ReviewDecision =
            serde_json::from_str(r#"{"decision":"rejected","note":"Screenshot is cropped"}"#).unwrap();
        assert_eq!(
            rejected,
            ReviewDecision::Rejected {
                note: Some("Screenshot is cropped".into())
            }
        );
        let approved: ReviewDecision = serde_json::from_str(r#"{"decision":"approved"}"#).unwrap();
        assert_eq!(approved, ReviewDecision::Approved);
    }
}
