use sea_orm::DbErr;
use thiserror::Error;

/// The only error the gating core surfaces to its caller.
///
/// Rate-limited and unauthorized requests are deliberate silent drops, not
/// errors: the engine returns `Ok(None)` for those so the front-end sends
/// nothing at all. Missing-artifact lookups are an expected outcome and are
/// reported as a normal [`crate::models::Decision::NotFound`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence layer could not be reached or failed mid-operation.
    /// Retry and backoff policy is the caller's concern.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
