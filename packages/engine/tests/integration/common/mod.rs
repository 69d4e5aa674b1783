use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use engine::clock::ManualClock;
use engine::config::{AppConfig, BotConfig, DatabaseConfig, GatingConfig, LinkConfig};
use engine::engine::EntitlementEngine;
use engine::models::{Decision, GateRequest, UploadPayload};
use engine::store::memory::MemoryStore;

pub const ADMIN_ID: i64 = 9000;
pub const BOT_USERNAME: &str = "MediaGateBot";
pub const UNLOCK_URL: &str = "https://example.com/unlock";

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bot: BotConfig {
            token: "test-token".into(),
            admin_id: ADMIN_ID,
            archive_channel_id: "-1001234567890".into(),
        },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
        },
        gating: GatingConfig::default(),
        links: LinkConfig {
            bot_username: BOT_USERNAME.into(),
            unlock_url: UNLOCK_URL.into(),
        },
    }
}

/// In-process engine over `MemoryStore` + `ManualClock`, mirroring the
/// production wiring in `engine::state`.
pub struct TestGate {
    pub engine: EntitlementEngine,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
}

impl TestGate {
    pub fn spawn() -> Self {
        Self::spawn_with(test_config())
    }

    pub fn spawn_with(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(epoch()));
        let engine = EntitlementEngine::new(store.clone(), store.clone(), clock.clone(), &config);
        Self {
            engine,
            clock,
            store,
        }
    }

    /// Entry interaction from a plain (non-admin) user.
    pub async fn entry(&self, user_id: i64, argument: Option<&str>) -> Option<Decision> {
        self.engine
            .handle(GateRequest::entry(user_id, argument))
            .await
            .expect("engine returned a store error")
    }

    /// Move the clock just past the default cooldown so the next entry from
    /// any user is not throttled.
    pub fn advance_past_cooldown(&self) {
        self.clock.advance(Duration::seconds(5));
    }

    /// Admin-uploads a video and returns the generated access code.
    pub async fn upload_video(&self, locator: &str) -> String {
        let payload = UploadPayload {
            video: Some(locator.into()),
            ..Default::default()
        };
        let decision = self
            .engine
            .handle(GateRequest::upload(ADMIN_ID, true, payload))
            .await
            .expect("engine returned a store error")
            .expect("admin upload produced no decision");

        match decision {
            Decision::Uploaded { code, .. } => code,
            other => panic!("expected Uploaded, got {other:?}"),
        }
    }

    /// Give `referrer_id` one referral credit by having a brand-new user
    /// enter with their referral argument.
    pub async fn refer(&self, referrer_id: i64, new_user_id: i64) {
        self.advance_past_cooldown();
        let decision = self
            .entry(new_user_id, Some(&format!("ref_{referrer_id}")))
            .await;
        assert!(decision.is_some(), "referred entry was throttled");
    }
}
