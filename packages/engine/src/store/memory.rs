use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::entity::{artifact, user_entitlement};
use crate::error::StoreError;
use crate::store::{ArtifactStore, EntitlementStore, UserStats};

/// In-process backend with the same conditional-update semantics as
/// [`super::db::DbStore`]. Used by the integration tests and suitable for
/// local single-process embedding.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<i64, user_entitlement::Model>>,
    artifacts: Mutex<HashMap<String, artifact::Model>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
}

fn bare_record(user_id: i64, now: DateTime<Utc>) -> user_entitlement::Model {
    user_entitlement::Model {
        user_id,
        username: None,
        first_name: None,
        expires_at: None,
        referral_count: 0,
        referred_by: None,
        last_action_at: None,
        created_at: now,
    }
}

#[async_trait]
impl EntitlementStore for MemoryStore {
    async fn get(
        &self,
        user_id: i64,
    ) -> Result<Option<user_entitlement::Model>, StoreError> {
        Ok(lock(&self.users)?.get(&user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = lock(&self.users)?;
        let record = users.entry(user_id).or_insert_with(|| bare_record(user_id, now));
        record.username = username.map(str::to_owned);
        record.first_name = first_name.map(str::to_owned);
        Ok(())
    }

    async fn upsert_expiry(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = lock(&self.users)?;
        let record = users.entry(user_id).or_insert_with(|| bare_record(user_id, now));
        record.expires_at = Some(expires_at);
        Ok(())
    }

    async fn adopt_referrer(
        &self,
        user_id: i64,
        referrer_id: i64,
    ) -> Result<bool, StoreError> {
        let mut users = lock(&self.users)?;
        match users.get_mut(&user_id) {
            Some(record) if record.referred_by.is_none() => {
                record.referred_by = Some(referrer_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_referral_count(
        &self,
        referrer_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = lock(&self.users)?;
        let record = users
            .entry(referrer_id)
            .or_insert_with(|| bare_record(referrer_id, now));
        record.referral_count += 1;
        Ok(())
    }

    async fn try_claim_action(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<bool, StoreError> {
        let mut users = lock(&self.users)?;
        let record = users.entry(user_id).or_insert_with(|| bare_record(user_id, now));

        if let Some(last) = record.last_action_at
            && now < last + cooldown
        {
            return Ok(false);
        }

        record.last_action_at = Some(now);
        Ok(true)
    }

    async fn user_stats(&self, now: DateTime<Utc>) -> Result<UserStats, StoreError> {
        let users = lock(&self.users)?;
        Ok(UserStats {
            total_users: users.len() as u64,
            unlocked_users: users.values().filter(|u| u.is_unlocked(now)).count() as u64,
            total_referrals: users.values().map(|u| u.referral_count).sum(),
        })
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn insert(&self, artifact: artifact::Model) -> Result<bool, StoreError> {
        let mut artifacts = lock(&self.artifacts)?;
        if artifacts.contains_key(&artifact.code) {
            return Ok(false);
        }
        artifacts.insert(artifact.code.clone(), artifact);
        Ok(true)
    }

    async fn get(&self, code: &str) -> Result<Option<artifact::Model>, StoreError> {
        Ok(lock(&self.artifacts)?.get(code).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.artifacts)?.len() as u64)
    }
}
