//! # Postgres adapters
//!
//! One [`PgStore`] implements every port over a shared pool. Balance and
//! stock changes are single conditional `UPDATE`s, so the precondition is
//! re-checked by the database at commit time.

use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityId, ActivityLog, ActivityStore, DomainError, Onboarding, ProgressStore,
    Quest, QuestCatalog, QuestId, QuestProgress, Reward, RewardCatalog, RewardId, SocialHandles,
    StoreError, StoreResult, Submission, SubmissionId, SubmissionReview, SubmissionStatus,
    SubmissionStore, User, UserId, UserStore,
};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

macro_rules! quest_columns {
    () => {
        "id, title, description, platform, quest_type, difficulty, reward, verification, quest_url, \
         validation_code, is_daily, is_new, is_sponsored, is_active, created_at"
    };
}

macro_rules! progress_columns {
    () => {
        "user_id, quest_id, viewed, submission_status, rejection_note, completed, \
         daily_completion_date, updated_at"
    };
}

macro_rules! submission_columns {
    () => {
        "id, quest_id, user_id, proof, status, submitted_at, reviewed_at, reviewed_by, review_note"
    };
}

macro_rules! user_columns {
    () => {
        "id, display_name, points, xp, max_xp, level, quests_completed, telegram, twitter, tiktok, \
         discord, instagram, role, welcome_seen, registered_email, created_at"
    };
}

macro_rules! reward_columns {
    () => {
        "id, name, description, cost, image_url, status, kind, quantity, claimed, created_at"
    };
}

fn db_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(db.message().to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn corrupt(column: &str, detail: impl Display) -> StoreError {
    StoreError::Unavailable(format!("corrupt value in column {column}: {detail}"))
}

fn col<'r, T>(row: &'r PgRow, column: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column).map_err(db_err)
}

fn label<T: FromStr<Err = DomainError>>(row: &PgRow, column: &str) -> StoreResult<T> {
    let raw: String = col(row, column)?;
    raw.parse().map_err(|e| corrupt(column, e))
}

fn count<T: TryFrom<i64>>(row: &PgRow, column: &str) -> StoreResult<T> {
    let raw: i64 = col(row, column)?;
    T::try_from(raw).map_err(|_| corrupt(column, raw))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn quest_from_row(row: &PgRow) -> StoreResult<Quest> {
    Ok(Quest {
        id: QuestId::from(col::<Uuid>(row, "id")?),
        title: col(row, "title")?,
        description: col(row, "description")?,
        platform: label(row, "platform")?,
        quest_type: label(row, "quest_type")?,
        difficulty: label(row, "difficulty")?,
        reward: count(row, "reward")?,
        verification: label(row, "verification")?,
        quest_url: col(row, "quest_url")?,
        validation_code: col(row, "validation_code")?,
        is_daily: col(row, "is_daily")?,
        is_new: col(row, "is_new")?,
        is_sponsored: col(row, "is_sponsored")?,
        is_active: col(row, "is_active")?,
        created_at: col(row, "created_at")?,
    })
}

fn bind_quest<'q>(query: PgQuery<'q>, quest: &Quest) -> PgQuery<'q> {
    query
        .bind(quest.id.as_uuid())
        .bind(quest.title.clone())
        .bind(quest.description.clone())
        .bind(quest.platform.as_str())
        .bind(quest.quest_type.as_str())
        .bind(quest.difficulty.as_str())
        .bind(i64::from(quest.reward))
        .bind(quest.verification.as_str())
        .bind(quest.quest_url.clone())
        .bind(quest.validation_code.clone())
        .bind(quest.is_daily)
        .bind(quest.is_new)
        .bind(quest.is_sponsored)
        .bind(quest.is_active)
        .bind(quest.created_at)
}

fn progress_from_row(row: &PgRow) -> StoreResult<QuestProgress> {
    let status: Option<String> = col(row, "submission_status")?;
    Ok(QuestProgress {
        user_id: UserId::from(col::<Uuid>(row, "user_id")?),
        quest_id: QuestId::from(col::<Uuid>(row, "quest_id")?),
        viewed: col(row, "viewed")?,
        submission_status: status
            .map(|s| s.parse::<SubmissionStatus>())
            .transpose()
            .map_err(|e| corrupt("submission_status", e))?,
        rejection_note: col(row, "rejection_note")?,
        completed: col(row, "completed")?,
        daily_completion_date: col::<Option<NaiveDate>>(row, "daily_completion_date")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn submission_from_row(row: &PgRow) -> StoreResult<Submission> {
    Ok(Submission {
        id: SubmissionId::from(col::<Uuid>(row, "id")?),
        quest_id: QuestId::from(col::<Uuid>(row, "quest_id")?),
        user_id: UserId::from(col::<Uuid>(row, "user_id")?),
        proof: col(row, "proof")?,
        status: label(row, "status")?,
        submitted_at: col(row, "submitted_at")?,
        reviewed_at: col::<Option<DateTime<Utc>>>(row, "reviewed_at")?,
        reviewed_by: col::<Option<Uuid>>(row, "reviewed_by")?.map(UserId::from),
        review_note: col(row, "review_note")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: UserId::from(col::<Uuid>(row, "id")?),
        display_name: col(row, "display_name")?,
        points: count(row, "points")?,
        xp: count(row, "xp")?,
        max_xp: count(row, "max_xp")?,
        level: count(row, "level")?,
        quests_completed: count(row, "quests_completed")?,
        socials: SocialHandles {
            telegram: col(row, "telegram")?,
            twitter: col(row, "twitter")?,
            tiktok: col(row, "tiktok")?,
            discord: col(row, "discord")?,
            instagram: col(row, "instagram")?,
        },
        role: label(row, "role")?,
        onboarding: Onboarding {
            welcome_seen: col(row, "welcome_seen")?,
            registered_email: col(row, "registered_email")?,
        },
        created_at: col(row, "created_at")?,
    })
}

fn reward_from_row(row: &PgRow) -> StoreResult<Reward> {
    let quantity: Option<i64> = col(row, "quantity")?;
    Ok(Reward {
        id: RewardId::from(col::<Uuid>(row, "id")?),
        name: col(row, "name")?,
        description: col(row, "description")?,
        cost: count(row, "cost")?,
        image_url: col(row, "image_url")?,
        status: label(row, "status")?,
        kind: label(row, "kind")?,
        quantity: quantity
            .map(u32::try_from)
            .transpose()
            .map_err(|e| corrupt("quantity", e))?,
        claimed: count(row, "claimed")?,
        created_at: col(row, "created_at")?,
    })
}

fn bind_reward<'q>(query: PgQuery<'q>, reward: &Reward) -> PgQuery<'q> {
    query
        .bind(reward.id.as_uuid())
        .bind(reward.name.clone())
        .bind(reward.description.clone())
        .bind(to_i64(reward.cost))
        .bind(reward.image_url.clone())
        .bind(reward.status.as_str())
        .bind(reward.kind.as_str())
        .bind(reward.quantity.map(i64::from))
        .bind(i64::from(reward.claimed))
        .bind(reward.created_at)
}

fn activity_from_row(row: &PgRow) -> StoreResult<ActivityEntry> {
    Ok(ActivityEntry {
        id: ActivityId::from(col::<Uuid>(row, "id")?),
        kind: label(row, "kind")?,
        description: col(row, "description")?,
        date: col(row, "date")?,
        points: col(row, "points")?,
    })
}

/// Every port, backed by one connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// Creates the schema if it is missing.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(include_str!("../migrations/0001_init.sql"))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        tracing::info!("database schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QuestCatalog for PgStore {
    async fn list_quests(&self) -> StoreResult<Vec<Quest>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            quest_columns!(),
            " FROM quests WHERE is_active ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(quest_from_row).collect()
    }

    async fn get_quest(&self, id: QuestId) -> StoreResult<Option<Quest>> {
        let row = sqlx::query(concat!("SELECT ", quest_columns!(), " FROM quests WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(quest_from_row).transpose()
    }

    async fn insert_quest(&self, quest: Quest) -> StoreResult<Quest> {
        let query = sqlx::query(concat!(
            "INSERT INTO quests (",
            quest_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ));
        bind_quest(query, &quest)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(quest)
    }

    async fn save_quest(&self, quest: Quest) -> StoreResult<Quest> {
        let query = sqlx::query(
            "UPDATE quests SET title = $2, description = $3, platform = $4, quest_type = $5, \
             difficulty = $6, reward = $7, verification = $8, quest_url = $9, validation_code = $10, \
             is_daily = $11, is_new = $12, is_sponsored = $13, is_active = $14, created_at = $15 \
             WHERE id = $1",
        );
        let result = bind_quest(query, &quest)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("quest", quest.id));
        }
        Ok(quest)
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn get_progress(&self, user_id: UserId, quest_id: QuestId) -> StoreResult<Option<QuestProgress>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            progress_columns!(),
            " FROM quest_progress WHERE user_id = $1 AND quest_id = $2"
        ))
        .bind(user_id.as_uuid())
        .bind(quest_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(progress_from_row).transpose()
    }

    async fn list_progress(&self, user_id: UserId) -> StoreResult<Vec<QuestProgress>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            progress_columns!(),
            " FROM quest_progress WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(progress_from_row).collect()
    }

    async fn save_progress(&self, progress: QuestProgress) -> StoreResult<()> {
        sqlx::query(concat!(
            "INSERT INTO quest_progress (",
            progress_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (user_id, quest_id) DO UPDATE SET \
             viewed = EXCLUDED.viewed, submission_status = EXCLUDED.submission_status, \
             rejection_note = EXCLUDED.rejection_note, completed = EXCLUDED.completed, \
             daily_completion_date = EXCLUDED.daily_completion_date, updated_at = EXCLUDED.updated_at"
        ))
        .bind(progress.user_id.as_uuid())
        .bind(progress.quest_id.as_uuid())
        .bind(progress.viewed)
        .bind(progress.submission_status.map(|s| s.as_str()))
        .bind(progress.rejection_note)
        .bind(progress.completed)
        .bind(progress.daily_completion_date)
        .bind(progress.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn record_submission(&self, submission: Submission) -> StoreResult<Submission> {
        sqlx::query(concat!(
            "INSERT INTO submissions (",
            submission_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(submission.id.as_uuid())
        .bind(submission.quest_id.as_uuid())
        .bind(submission.user_id.as_uuid())
        .bind(submission.proof.clone())
        .bind(submission.status.as_str())
        .bind(submission.submitted_at)
        .bind(submission.reviewed_at)
        .bind(submission.reviewed_by.map(|id| id.as_uuid()))
        .bind(submission.review_note.clone())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(submission)
    }

    async fn update_submission_status(
        &self,
        id: SubmissionId,
        review: SubmissionReview,
    ) -> StoreResult<Submission> {
        if review.status == SubmissionStatus::Pending {
            return Err(StoreError::Conflict("a review must approve or reject".into()));
        }
        let row = sqlx::query(concat!(
            "UPDATE submissions SET status = $2, reviewed_by = $3, review_note = $4, reviewed_at = $5 \
             WHERE id = $1 AND status = 'pending' RETURNING ",
            submission_columns!()
        ))
        .bind(id.as_uuid())
        .bind(review.status.as_str())
        .bind(review.reviewer.as_uuid())
        .bind(review.note)
        .bind(review.reviewed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => submission_from_row(&row),
            None => match self.get_submission(id).await? {
                Some(existing) => Err(StoreError::Conflict(format!(
                    "submission {id} already {}",
                    existing.status
                ))),
                None => Err(StoreError::not_found("submission", id)),
            },
        }
    }

    async fn reopen_submission(&self, id: SubmissionId) -> StoreResult<Submission> {
        let row = sqlx::query(concat!(
            "UPDATE submissions SET status = 'pending', reviewed_by = NULL, review_note = NULL, \
             reviewed_at = NULL WHERE id = $1 RETURNING ",
            submission_columns!()
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => submission_from_row(&row),
            None => Err(StoreError::not_found("submission", id)),
        }
    }

    async fn get_submission(&self, id: SubmissionId) -> StoreResult<Option<Submission>> {
        let row = sqlx::query(concat!("SELECT ", submission_columns!(), " FROM submissions WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(submission_from_row).transpose()
    }

    async fn list_submissions(&self, status: Option<SubmissionStatus>) -> StoreResult<Vec<Submission>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            submission_columns!(),
            " FROM submissions WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY submitted_at DESC, id DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(submission_from_row).collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(concat!(
            "INSERT INTO users (",
            user_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(user.id.as_uuid())
        .bind(user.display_name.clone())
        .bind(to_i64(user.points))
        .bind(i64::from(user.xp))
        .bind(i64::from(user.max_xp))
        .bind(i64::from(user.level))
        .bind(i64::from(user.quests_completed))
        .bind(user.socials.telegram.clone())
        .bind(user.socials.twitter.clone())
        .bind(user.socials.tiktok.clone())
        .bind(user.socials.discord.clone())
        .bind(user.socials.instagram.clone())
        .bind(user.role.as_str())
        .bind(user.onboarding.welcome_seen)
        .bind(user.onboarding.registered_email.clone())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(concat!("SELECT ", user_columns!(), " FROM users ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn adjust_points(&self, id: UserId, delta: i64) -> StoreResult<User> {
        let row = sqlx::query(concat!(
            "UPDATE users SET points = points + $2 WHERE id = $1 AND points + $2 >= 0 RETURNING ",
            user_columns!()
        ))
        .bind(id.as_uuid())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => user_from_row(&row),
            None => {
                let current = self
                    .get_user(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("user", id))?;
                Err(StoreError::InsufficientFunds {
                    required: delta.unsigned_abs(),
                    available: current.points,
                })
            }
        }
    }

    async fn record_progression(&self, id: UserId, xp: u32, counts_toward_total: bool) -> StoreResult<User> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 1. Lock the row
        let row = sqlx::query(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1 FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found("user", id))?;
        let mut user = user_from_row(&row)?;

        // 2. Level rollover happens in the model
        user.record_completion(xp, counts_toward_total);

        // 3. Write back
        sqlx::query("UPDATE users SET xp = $2, level = $3, quests_completed = $4 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(i64::from(user.xp))
            .bind(i64::from(user.level))
            .bind(i64::from(user.quests_completed))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(user)
    }

    async fn save_profile(&self, user: User) -> StoreResult<User> {
        let row = sqlx::query(concat!(
            "UPDATE users SET display_name = $2, telegram = $3, twitter = $4, tiktok = $5, \
             discord = $6, instagram = $7, welcome_seen = $8, registered_email = $9 \
             WHERE id = $1 RETURNING ",
            user_columns!()
        ))
        .bind(user.id.as_uuid())
        .bind(user.display_name)
        .bind(user.socials.telegram)
        .bind(user.socials.twitter)
        .bind(user.socials.tiktok)
        .bind(user.socials.discord)
        .bind(user.socials.instagram)
        .bind(user.onboarding.welcome_seen)
        .bind(user.onboarding.registered_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| StoreError::not_found("user", user.id))?;
        user_from_row(&row)
    }
}

#[async_trait]
impl RewardCatalog for PgStore {
    async fn list_rewards(&self) -> StoreResult<Vec<Reward>> {
        let rows = sqlx::query(concat!("SELECT ", reward_columns!(), " FROM rewards ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(reward_from_row).collect()
    }

    async fn get_reward(&self, id: RewardId) -> StoreResult<Option<Reward>> {
        let row = sqlx::query(concat!("SELECT ", reward_columns!(), " FROM rewards WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(reward_from_row).transpose()
    }

    async fn insert_reward(&self, reward: Reward) -> StoreResult<Reward> {
        let query = sqlx::query(concat!(
            "INSERT INTO rewards (",
            reward_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ));
        bind_reward(query, &reward)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(reward)
    }

    async fn save_reward(&self, reward: Reward) -> StoreResult<Reward> {
        let query = sqlx::query(
            "UPDATE rewards SET name = $2, description = $3, cost = $4, image_url = $5, status = $6, \
             kind = $7, quantity = $8, claimed = $9, created_at = $10 WHERE id = $1",
        );
        let result = bind_reward(query, &reward)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("reward", reward.id));
        }
        Ok(reward)
    }

    async fn take_stock(&self, id: RewardId) -> StoreResult<Reward> {
        let row = sqlx::query(concat!(
            "UPDATE rewards SET quantity = quantity - 1, claimed = claimed + 1 \
             WHERE id = $1 AND (quantity IS NULL OR quantity > 0) RETURNING ",
            reward_columns!()
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => reward_from_row(&row),
            None => match self.get_reward(id).await? {
                Some(reward) => Err(StoreError::OutOfStock(reward.name)),
                None => Err(StoreError::not_found("reward", id)),
            },
        }
    }

    async fn return_stock(&self, id: RewardId) -> StoreResult<Reward> {
        let row = sqlx::query(concat!(
            "UPDATE rewards SET quantity = quantity + 1, claimed = GREATEST(claimed - 1, 0) \
             WHERE id = $1 RETURNING ",
            reward_columns!()
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| StoreError::not_found("reward", id))?;
        reward_from_row(&row)
    }
}

#[async_trait]
impl ActivityStore for PgStore {
    async fn append(&self, user_id: UserId, entry: ActivityEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO activity (id, user_id, kind, description, date, points) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(entry.kind.as_str())
        .bind(entry.description)
        .bind(entry.date)
        .bind(entry.points)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn history(&self, user_id: UserId) -> StoreResult<ActivityLog> {
        let rows = sqlx::query(
            "SELECT id, kind, description, date, points FROM activity \
             WHERE user_id = $1 ORDER BY date, id",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(activity_from_row).collect()
    }
}
