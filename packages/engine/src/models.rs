use chrono::{DateTime, Utc};
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Media class of a stored artifact.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sea_orm::DeriveActiveEnum,
    sea_orm::EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    #[sea_orm(string_value = "document")]
    Document,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "photo")]
    Photo,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Photo => "photo",
        }
    }

    /// Whether delivery should hint the gateway to stream instead of
    /// forcing a download.
    pub fn streaming_hint(&self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Raw upload payload as the front-end saw it. A well-formed upload carries
/// exactly one locator; when several are present the classification order is
/// document, then video, then photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPayload {
    pub document: Option<String>,
    pub video: Option<String>,
    pub photo: Option<String>,
}

impl UploadPayload {
    /// Pick the artifact kind and locator, by priority. `None` when the
    /// payload carries no media at all.
    pub fn classify(&self) -> Option<(ArtifactKind, &str)> {
        if let Some(locator) = &self.document {
            Some((ArtifactKind::Document, locator))
        } else if let Some(locator) = &self.video {
            Some((ArtifactKind::Video, locator))
        } else if let Some(locator) = &self.photo {
            Some((ArtifactKind::Photo, locator))
        } else {
            None
        }
    }
}

/// Request kind as normalized by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// A start/entry interaction, optionally carrying an argument.
    Entry,
    /// Privileged usage-statistics query.
    StatusQuery,
}

/// Normalized inbound request handed to the engine by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRequest {
    pub actor_id: i64,
    pub actor_is_admin: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub command: Command,
    /// Entry argument: `unlock`, `ref_<id>`, or an artifact access code.
    pub argument: Option<String>,
    /// Present when the actor attached media to the message.
    pub upload: Option<UploadPayload>,
}

impl GateRequest {
    pub fn entry(actor_id: i64, argument: Option<&str>) -> Self {
        Self {
            actor_id,
            actor_is_admin: false,
            username: None,
            first_name: None,
            command: Command::Entry,
            argument: argument.map(str::to_owned),
            upload: None,
        }
    }

    pub fn status_query(actor_id: i64, actor_is_admin: bool) -> Self {
        Self {
            actor_id,
            actor_is_admin,
            username: None,
            first_name: None,
            command: Command::StatusQuery,
            argument: None,
            upload: None,
        }
    }

    pub fn upload(actor_id: i64, actor_is_admin: bool, payload: UploadPayload) -> Self {
        Self {
            actor_id,
            actor_is_admin,
            username: None,
            first_name: None,
            command: Command::Entry,
            argument: None,
            upload: Some(payload),
        }
    }
}

/// Whole hours and minutes left on an entitlement, floor-divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub hours: i64,
    pub minutes: i64,
}

impl Remaining {
    pub fn until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let seconds = (expires_at - now).num_seconds().max(0);
        Self {
            hours: seconds / 3600,
            minutes: (seconds % 3600) / 60,
        }
    }
}

/// A single label + url pair the gateway renders as an inline button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub url: String,
}

/// Instruction to mirror an uploaded artifact into the permanently retained,
/// copy-protected archive channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub locator: String,
    pub kind: ArtifactKind,
    pub destination: String,
    pub copy_protected: bool,
}

/// Aggregate usage numbers for the statistics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_users: u64,
    pub unlocked_users: u64,
    pub total_artifacts: u64,
    pub total_referrals: i64,
}

/// What the front-end should do in response to a request.
///
/// Throttled and unauthorized requests never produce a `Decision`; the
/// engine returns `Ok(None)` and the front-end stays silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// Locked/unlocked status report with referral progress.
    Status {
        unlocked: bool,
        remaining: Option<Remaining>,
        referral_count: i64,
        referral_required: i64,
        referral_url: String,
    },
    /// A fresh entitlement was granted.
    Unlocked { remaining: Remaining },
    /// Deliver the artifact with viewing allowed but copy/forward disabled.
    Deliver {
        code: String,
        kind: ArtifactKind,
        locator: String,
        remaining: Remaining,
        copy_protected: bool,
        streaming_hint: bool,
    },
    /// The requested access code matches no stored artifact.
    NotFound,
    /// Actor is locked: show the unlock and referral affordances.
    LockedPrompt {
        referral_count: i64,
        referral_required: i64,
        buttons: Vec<Button>,
    },
    /// Artifact stored; share link ready, archive mirroring requested.
    Uploaded {
        code: String,
        share_link: String,
        archive: ArchiveRequest,
    },
    Stats(UsageStats),
}
