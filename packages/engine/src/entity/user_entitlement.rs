use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user gating record. Created on first gating-relevant interaction,
/// never deleted; "locked" vs "unlocked" is derived from `expires_at` at
/// read time, not stored.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_entitlement")]
pub struct Model {
    /// External user id from the chat transport.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    pub username: Option<String>,
    pub first_name: Option<String>,

    /// Entitlement expiry. Absent or in the past means locked.
    pub expires_at: Option<DateTimeUtc>,

    /// Distinct first-seen referees credited to this user. Monotonic.
    pub referral_count: i64,

    /// Who referred this user. Set at most once, first-write-wins.
    pub referred_by: Option<i64>,

    /// Timestamp of the last action that passed the rate limiter.
    pub last_action_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True while `now` is strictly before the expiry. At exactly
    /// `expires_at` the user is locked again.
    pub fn is_unlocked(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now < expires_at)
    }
}
