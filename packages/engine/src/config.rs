use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Upper bound on configured gating durations (100 years). Keeps datetime
/// arithmetic on `now + duration` inside chrono's representable range no
/// matter what the operator configures.
const MAX_GATING_SECONDS: i64 = 100 * 365 * 24 * 3600;

fn clamped_seconds(seconds: u64) -> Duration {
    Duration::seconds(
        i64::try_from(seconds)
            .unwrap_or(MAX_GATING_SECONDS)
            .min(MAX_GATING_SECONDS),
    )
}

/// Front-end credentials and privileged identities.
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    /// Transport credential. Opaque to the core; handed to the front-end.
    pub token: String,
    /// The single privileged user id. Uploads and statistics queries from
    /// anyone else are silently ignored.
    pub admin_id: i64,
    /// Archive destination for uploaded artifacts, e.g. `-1003510118476`.
    pub archive_channel_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Tunable gating rules.
#[derive(Debug, Deserialize, Clone)]
pub struct GatingConfig {
    /// Length of a granted entitlement, in seconds.
    pub unlock_seconds: u64,
    /// Referral count at which a locked user is auto-granted on their next
    /// artifact request.
    pub referral_required: i64,
    /// Minimum interval between a user's gating actions, in seconds.
    pub cooldown_seconds: u64,
}

impl GatingConfig {
    /// Entitlement window as a duration, clamped to the 100-year bound.
    pub fn unlock_duration(&self) -> Duration {
        clamped_seconds(self.unlock_seconds)
    }

    /// Cooldown as a duration, clamped to the 100-year bound.
    pub fn cooldown_duration(&self) -> Duration {
        clamped_seconds(self.cooldown_seconds)
    }
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            unlock_seconds: 10_800,
            referral_required: 3,
            cooldown_seconds: 5,
        }
    }
}

/// Link construction inputs for the buttons the front-end renders.
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// Bot username used in `https://t.me/<username>?start=...` deep links.
    pub bot_username: String,
    /// External unlock action the locked prompt points at.
    pub unlock_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub gating: GatingConfig,
    pub links: LinkConfig,
}

impl AppConfig {
    /// Load configuration from `config/config.toml` (optional) with
    /// `MEDIAGATE__`-prefixed environment overrides, e.g.
    /// `MEDIAGATE__BOT__ADMIN_ID` or `MEDIAGATE__GATING__UNLOCK_SECONDS`.
    ///
    /// A missing required key (bot token, admin id, archive channel,
    /// database url) is a [`ConfigError`]; the embedding front-end logs it
    /// and exits non-zero.
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("gating.unlock_seconds", 10_800)?
            .set_default("gating.referral_required", 3)?
            .set_default("gating.cooldown_seconds", 5)?
            .add_source(File::with_name("config/config").required(false))
            .add_source(Environment::with_prefix("MEDIAGATE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
