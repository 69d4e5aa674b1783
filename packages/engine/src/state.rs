use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::engine::EntitlementEngine;
use crate::error::StoreError;
use crate::store::db::{DbStore, init_db};

/// Process-wide context: configuration, database handle and the wired
/// engine. Built once at startup and passed by reference into the
/// front-end; there are no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EntitlementEngine>,
    pub db: DatabaseConnection,
    pub config: AppConfig,
}

impl AppState {
    /// Connect to the store and wire the engine. Configuration must already
    /// be loaded; a missing key fails in [`AppConfig::load`] before this
    /// runs.
    pub async fn initialize(config: AppConfig) -> Result<Self, StoreError> {
        let db = init_db(&config.database.url).await?;
        let store = Arc::new(DbStore::new(db.clone()));

        let engine = Arc::new(EntitlementEngine::new(
            store.clone(),
            store,
            Arc::new(SystemClock),
            &config,
        ));

        Ok(Self { engine, db, config })
    }
}
