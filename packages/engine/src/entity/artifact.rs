use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::ArtifactKind;

/// A stored media artifact, keyed by its opaque access code. Written exactly
/// once at upload time by the administrator, read-only afterwards.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artifact")]
pub struct Model {
    /// 8-character lowercase-hex access code, generator-assigned.
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,

    pub kind: ArtifactKind,

    /// Transport-specific locator. Opaque to the core, never inspected.
    pub locator: String,

    /// Admin id that uploaded the artifact.
    pub uploaded_by: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
