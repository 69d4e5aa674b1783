//! Persistence seam for the gating engine.
//!
//! Two backends implement the traits: [`db::DbStore`] (sea-orm, production)
//! and [`memory::MemoryStore`] (in-process, tests and local embedding).
//! Every per-user mutation is a single conditional update or
//! insert-if-absent at the backend so concurrent requests for the same user
//! cannot lose updates.

pub mod db;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::entity::{artifact, user_entitlement};
use crate::error::StoreError;

/// Aggregates over the entitlement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub total_users: u64,
    /// Users whose `expires_at` is strictly after `now`.
    pub unlocked_users: u64,
    /// Sum of `referral_count` across all users.
    pub total_referrals: i64,
}

/// Per-user entitlement records: expiry, referral credit, rate-limit stamp.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn get(&self, user_id: i64)
    -> Result<Option<user_entitlement::Model>, StoreError>;

    /// Record the transport profile fields, creating the record if absent.
    async fn upsert_profile(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Set `expires_at` unconditionally. Grants always overwrite; they never
    /// merge with a longer existing window.
    async fn upsert_expiry(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Set `referred_by` on an existing record whose link is still unset.
    /// Returns whether this call won the link; callers gate crediting on it
    /// plus the referee being first-ever seen.
    async fn adopt_referrer(&self, user_id: i64, referrer_id: i64)
    -> Result<bool, StoreError>;

    /// Atomically add one referral credit, creating the referrer's record
    /// if absent.
    async fn increment_referral_count(
        &self,
        referrer_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Claim a rate-limit slot. Returns false (and mutates nothing) while
    /// `now` is inside the cooldown window after the last allowed action;
    /// otherwise stamps `last_action_at = now` and returns true.
    async fn try_claim_action(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<bool, StoreError>;

    async fn user_stats(&self, now: DateTime<Utc>) -> Result<UserStats, StoreError>;
}

/// Access-code to artifact registry. Codes are written once and never
/// mutated or deleted.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Insert under the artifact's code. Returns false when the code is
    /// already taken; the caller regenerates and retries.
    async fn insert(&self, artifact: artifact::Model) -> Result<bool, StoreError>;

    async fn get(&self, code: &str) -> Result<Option<artifact::Model>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
