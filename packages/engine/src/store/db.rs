use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Alias, Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait,
    ExprTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, Set,
};

use crate::entity::{artifact, user_entitlement};
use crate::error::StoreError;
use crate::store::{ArtifactStore, EntitlementStore, UserStats};

/// Connect to the database and sync the entity schema.
pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(StdDuration::from_secs(8))
        .acquire_timeout(StdDuration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("engine::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// sea-orm backend. All mutations are single statements (insert-if-absent
/// or guarded `UPDATE`), decided by `rows_affected`, so same-user races
/// cannot double-apply.
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a bare record for the user if none exists. No-op otherwise.
    async fn ensure_record(&self, user_id: i64, now: DateTime<Utc>) -> Result<(), StoreError> {
        let row = user_entitlement::ActiveModel {
            user_id: Set(user_id),
            referral_count: Set(0),
            created_at: Set(now),
            ..Default::default()
        };

        user_entitlement::Entity::insert(row)
            .on_conflict(
                OnConflict::column(user_entitlement::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl EntitlementStore for DbStore {
    async fn get(
        &self,
        user_id: i64,
    ) -> Result<Option<user_entitlement::Model>, StoreError> {
        Ok(user_entitlement::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?)
    }

    async fn upsert_profile(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let row = user_entitlement::ActiveModel {
            user_id: Set(user_id),
            username: Set(username.map(str::to_owned)),
            first_name: Set(first_name.map(str::to_owned)),
            referral_count: Set(0),
            created_at: Set(now),
            ..Default::default()
        };

        user_entitlement::Entity::insert(row)
            .on_conflict(
                OnConflict::column(user_entitlement::Column::UserId)
                    .update_columns([
                        user_entitlement::Column::Username,
                        user_entitlement::Column::FirstName,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn upsert_expiry(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let row = user_entitlement::ActiveModel {
            user_id: Set(user_id),
            expires_at: Set(Some(expires_at)),
            referral_count: Set(0),
            created_at: Set(now),
            ..Default::default()
        };

        user_entitlement::Entity::insert(row)
            .on_conflict(
                OnConflict::column(user_entitlement::Column::UserId)
                    .update_column(user_entitlement::Column::ExpiresAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn adopt_referrer(
        &self,
        user_id: i64,
        referrer_id: i64,
    ) -> Result<bool, StoreError> {
        let updated = user_entitlement::Entity::update_many()
            .col_expr(
                user_entitlement::Column::ReferredBy,
                Expr::value(Some(referrer_id)),
            )
            .filter(user_entitlement::Column::UserId.eq(user_id))
            .filter(user_entitlement::Column::ReferredBy.is_null())
            .exec(&self.db)
            .await?;

        Ok(updated.rows_affected > 0)
    }

    async fn increment_referral_count(
        &self,
        referrer_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // The referrer may never have interacted themselves.
        self.ensure_record(referrer_id, now).await?;

        user_entitlement::Entity::update_many()
            .col_expr(
                user_entitlement::Column::ReferralCount,
                Expr::col(user_entitlement::Column::ReferralCount).add(1),
            )
            .filter(user_entitlement::Column::UserId.eq(referrer_id))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn try_claim_action(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<bool, StoreError> {
        self.ensure_record(user_id, now).await?;

        let threshold = now - cooldown;
        let updated = user_entitlement::Entity::update_many()
            .col_expr(
                user_entitlement::Column::LastActionAt,
                Expr::value(Some(now)),
            )
            .filter(user_entitlement::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(user_entitlement::Column::LastActionAt.is_null())
                    .add(user_entitlement::Column::LastActionAt.lte(threshold)),
            )
            .exec(&self.db)
            .await?;

        Ok(updated.rows_affected > 0)
    }

    async fn user_stats(&self, now: DateTime<Utc>) -> Result<UserStats, StoreError> {
        let total_users = user_entitlement::Entity::find().count(&self.db).await?;

        let unlocked_users = user_entitlement::Entity::find()
            .filter(user_entitlement::Column::ExpiresAt.gt(now))
            .count(&self.db)
            .await?;

        // SUM(bigint) comes back as numeric on postgres; cast it down.
        let total_referrals: Option<i64> = user_entitlement::Entity::find()
            .select_only()
            .column_as(
                Expr::expr(user_entitlement::Column::ReferralCount.sum())
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .into_tuple()
            .one(&self.db)
            .await?
            .flatten();

        Ok(UserStats {
            total_users,
            unlocked_users,
            total_referrals: total_referrals.unwrap_or(0),
        })
    }
}

#[async_trait]
impl ArtifactStore for DbStore {
    async fn insert(&self, artifact: artifact::Model) -> Result<bool, StoreError> {
        let inserted = artifact::Entity::insert(artifact.into_active_model())
            .on_conflict(
                OnConflict::column(artifact::Column::Code)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(inserted > 0)
    }

    async fn get(&self, code: &str) -> Result<Option<artifact::Model>, StoreError> {
        Ok(artifact::Entity::find_by_id(code.to_owned())
            .one(&self.db)
            .await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(artifact::Entity::find().count(&self.db).await?)
    }
}
