use chrono::{DateTime, Duration, Utc};

use crate::error::StoreError;
use crate::store::EntitlementStore;

/// Minimum-interval guard for gating actions.
///
/// The claim runs before any other side effect of a request, so a throttled
/// request is fully inert: no response, no state change, and the stored
/// `last_action_at` stays at the last allowed action.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    cooldown: Duration,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Claim a slot for the user. False means the request must be dropped.
    pub async fn try_act(
        &self,
        store: &dyn EntitlementStore,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let allowed = store.try_claim_action(user_id, now, self.cooldown).await?;
        if !allowed {
            tracing::debug!(user_id, "gating action throttled");
        }
        Ok(allowed)
    }
}
