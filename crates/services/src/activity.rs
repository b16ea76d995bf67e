use std::sync::Arc;

use domains::{ActivityEntry, ActivityKind, ActivityStore, UserId};

use crate::errors::ServiceError;
use crate::Ports;

/// Read side of the activity log.
pub struct ActivityService {
    activity: Arc<dyn ActivityStore>,
}

impl ActivityService {
    pub fn new(ports: &Ports) -> Self {
        Self {
            activity: Arc::clone(&ports.activity),
        }
    }

    /// Newest first. `None` returns every kind.
    pub async fn history(&self, user_id: UserId, kind: Option<ActivityKind>) -> Result<Vec<ActivityEntry>, ServiceError> {
        let log = self.activity.history(user_id).await?;
        Ok(log.filter_by_kind(kind).into_iter().cloned().collect())
    }
}
