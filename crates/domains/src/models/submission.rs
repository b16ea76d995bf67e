use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{QuestId, SubmissionId, UserId};
use crate::errors::DomainError;

labelled_enum!(
    SubmissionStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

/// Proof of completion for a Manual quest, awaiting one admin decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub quest_id: QuestId,
    pub user_id: UserId,
    /// Free text or a URL
    pub proof: String,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserId>,
    pub review_note: Option<String>,
}

/// An admin's verdict as handed to the submission store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReview {
    pub reviewer: UserId,
    pub status: SubmissionStatus,
    pub note: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        quest_id: QuestId,
        user_id: UserId,
        proof: String,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            quest_id,
            user_id,
            proof,
            status: SubmissionStatus::Pending,
            submitted_at,
            reviewed_at: None,
            reviewed_by: None,
            review_note: None,
        }
    }

    /// Records the admin decision. A submission is decided exactly once.
    pub fn resolve(&mut self, review: SubmissionReview) -> Result<(), DomainError> {
        if self.status != SubmissionStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "submission {} already {}",
                self.id, self.status
            )));
        }
        if review.status == SubmissionStatus::Pending {
            return Err(DomainError::Validation(
                "a review must approve or reject".into(),
            ));
        }
        self.status = review.status;
        self.reviewed_at = Some(review.reviewed_at);
        self.reviewed_by = Some(review.reviewer);
        self.review_note = review.note;
        Ok(())
    }

    /// Puts a decided submission back in the review queue, dropping the
    /// verdict. Used when the writes that follow a decision fail.
    pub fn reopen(&mut self) {
        self.status = SubmissionStatus::Pending;
        self.reviewed_at = None;
        self.reviewed_by = None;
        self.review_note = None;
    }
}
