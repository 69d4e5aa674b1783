use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::clock::Clock;
use crate::codes;
use crate::config::AppConfig;
use crate::entity::artifact;
use crate::error::StoreError;
use crate::limiter::RateLimiter;
use crate::links;
use crate::models::{
    ArchiveRequest, Button, Command, Decision, GateRequest, Remaining, UploadPayload, UsageStats,
};
use crate::referral;
use crate::store::{ArtifactStore, EntitlementStore};

/// The decision core: answers every inbound request with at most one
/// [`Decision`].
///
/// `Ok(None)` is a deliberate silent drop: either the rate limiter
/// throttled a gating request, or a non-admin attempted a privileged
/// operation. Neither produces a visible response, so admin-only features
/// stay indistinguishable from unrecognized input.
pub struct EntitlementEngine {
    users: Arc<dyn EntitlementStore>,
    artifacts: Arc<dyn ArtifactStore>,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    admin_id: i64,
    unlock: Duration,
    referral_required: i64,
    bot_username: String,
    unlock_url: String,
    archive_channel_id: String,
}

impl EntitlementEngine {
    pub fn new(
        users: Arc<dyn EntitlementStore>,
        artifacts: Arc<dyn ArtifactStore>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users,
            artifacts,
            clock,
            limiter: RateLimiter::new(config.gating.cooldown_duration()),
            admin_id: config.bot.admin_id,
            unlock: config.gating.unlock_duration(),
            referral_required: config.gating.referral_required,
            bot_username: config.links.bot_username.clone(),
            unlock_url: config.links.unlock_url.clone(),
            archive_channel_id: config.bot.archive_channel_id.clone(),
        }
    }

    /// Process one normalized request to completion.
    #[instrument(skip(self, req), fields(actor_id = req.actor_id))]
    pub async fn handle(&self, req: GateRequest) -> Result<Option<Decision>, StoreError> {
        if let Some(upload) = req.upload.clone() {
            return self.handle_upload(&req, &upload).await;
        }

        match req.command {
            Command::StatusQuery => self.handle_stats(&req).await,
            Command::Entry => self.handle_entry(&req).await,
        }
    }

    fn is_admin(&self, req: &GateRequest) -> bool {
        req.actor_is_admin && req.actor_id == self.admin_id
    }

    async fn handle_entry(&self, req: &GateRequest) -> Result<Option<Decision>, StoreError> {
        let now = self.clock.now();

        // Referral eligibility depends on whether the entrant had any record
        // before this request; the claim below creates one, so for `ref_`
        // entries the existence check must happen first.
        let entrant_was_known = match req.argument.as_deref() {
            Some(arg) if arg.starts_with("ref_") => {
                self.users.get(req.actor_id).await?.is_some()
            }
            _ => false,
        };

        if !self.limiter.try_act(&*self.users, req.actor_id, now).await? {
            return Ok(None);
        }

        self.users
            .upsert_profile(
                req.actor_id,
                req.username.as_deref(),
                req.first_name.as_deref(),
                now,
            )
            .await?;

        match req.argument.as_deref() {
            None => Ok(Some(self.status_report(req.actor_id, now).await?)),
            Some("unlock") => {
                let remaining = self.grant(req.actor_id, now).await?;
                Ok(Some(Decision::Unlocked { remaining }))
            }
            Some(arg) if arg.starts_with("ref_") => {
                referral::process_entry(&*self.users, req.actor_id, arg, entrant_was_known, now)
                    .await?;
                Ok(Some(self.status_report(req.actor_id, now).await?))
            }
            Some(code) => Ok(Some(self.artifact_request(req.actor_id, code, now).await?)),
        }
    }

    async fn artifact_request(
        &self,
        user_id: i64,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Decision, StoreError> {
        let record = self.users.get(user_id).await?;
        let referral_count = record.as_ref().map_or(0, |r| r.referral_count);
        let active_expiry = record
            .as_ref()
            .and_then(|r| r.expires_at)
            .filter(|expires_at| now < *expires_at);

        if let Some(expires_at) = active_expiry {
            return match self.artifacts.get(code).await? {
                Some(artifact) => Ok(Decision::Deliver {
                    streaming_hint: artifact.kind.streaming_hint(),
                    code: artifact.code,
                    kind: artifact.kind,
                    locator: artifact.locator,
                    remaining: Remaining::until(expires_at, now),
                    copy_protected: true,
                }),
                None => {
                    tracing::debug!(user_id, code, "unknown access code");
                    Ok(Decision::NotFound)
                }
            };
        }

        if referral_count >= self.referral_required {
            let remaining = self.grant(user_id, now).await?;
            return Ok(Decision::Unlocked { remaining });
        }

        Ok(Decision::LockedPrompt {
            referral_count,
            referral_required: self.referral_required,
            buttons: vec![
                Button {
                    label: "Unlock access".into(),
                    url: self.unlock_url.clone(),
                },
                Button {
                    label: "Invite friends".into(),
                    url: links::referral_link(&self.bot_username, user_id),
                },
            ],
        })
    }

    async fn status_report(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Decision, StoreError> {
        let record = self.users.get(user_id).await?;
        let referral_count = record.as_ref().map_or(0, |r| r.referral_count);
        let remaining = record
            .as_ref()
            .and_then(|r| r.expires_at)
            .filter(|expires_at| now < *expires_at)
            .map(|expires_at| Remaining::until(expires_at, now));

        Ok(Decision::Status {
            unlocked: remaining.is_some(),
            remaining,
            referral_count,
            referral_required: self.referral_required,
            referral_url: links::referral_link(&self.bot_username, user_id),
        })
    }

    /// Grant a full entitlement window starting now. Overwrites any
    /// existing expiry; grants never stack.
    async fn grant(&self, user_id: i64, now: DateTime<Utc>) -> Result<Remaining, StoreError> {
        let expires_at = now + self.unlock;
        self.users.upsert_expiry(user_id, now, expires_at).await?;
        tracing::info!(user_id, %expires_at, "entitlement granted");
        Ok(Remaining::until(expires_at, now))
    }

    async fn handle_upload(
        &self,
        req: &GateRequest,
        upload: &UploadPayload,
    ) -> Result<Option<Decision>, StoreError> {
        if !self.is_admin(req) {
            tracing::debug!(actor_id = req.actor_id, "ignoring upload from non-admin");
            return Ok(None);
        }

        let Some((kind, locator)) = upload.classify() else {
            tracing::debug!("upload carried no media");
            return Ok(None);
        };

        let now = self.clock.now();
        let code = loop {
            let code = codes::generate();
            let stored = artifact::Model {
                code: code.clone(),
                kind,
                locator: locator.to_owned(),
                uploaded_by: req.actor_id,
                created_at: now,
            };
            if self.artifacts.insert(stored).await? {
                break code;
            }
            tracing::debug!(%code, "access code collision, regenerating");
        };

        tracing::info!(%code, kind = kind.as_str(), "artifact stored");

        Ok(Some(Decision::Uploaded {
            share_link: links::entry_link(&self.bot_username, &code),
            code,
            archive: ArchiveRequest {
                locator: locator.to_owned(),
                kind,
                destination: links::channel_link(&self.archive_channel_id),
                copy_protected: true,
            },
        }))
    }

    async fn handle_stats(&self, req: &GateRequest) -> Result<Option<Decision>, StoreError> {
        if !self.is_admin(req) {
            tracing::debug!(actor_id = req.actor_id, "ignoring stats query from non-admin");
            return Ok(None);
        }

        let now = self.clock.now();
        let users = self.users.user_stats(now).await?;
        let total_artifacts = self.artifacts.count().await?;

        Ok(Some(Decision::Stats(UsageStats {
            total_users: users.total_users,
            unlocked_users: users.unlocked_users,
            total_artifacts,
            total_referrals: users.total_referrals,
        })))
    }
}
