use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::store::EntitlementStore;

/// Extract the referrer id from a `ref_<id>` entry argument.
pub fn parse_referral_argument(argument: &str) -> Option<i64> {
    argument.strip_prefix("ref_")?.parse().ok()
}

/// Referral-credit protocol for an entry carrying a `ref_` argument.
///
/// Credit goes to the NAMED referrer, not the entrant, and at most once per
/// distinct referee, keyed by the referee's first-ever appearance:
/// - self-referral is ignored;
/// - an entrant with any prior record is never credited to anyone, even if
///   that record has no referrer link yet (a user who first entered plainly
///   and supplies `ref_` later credits nobody);
/// - the link itself is first-write-wins at the store, so concurrent first
///   entries cannot double-credit.
///
/// Returns whether the referrer was credited.
pub async fn process_entry(
    store: &dyn EntitlementStore,
    entrant_id: i64,
    argument: &str,
    entrant_was_known: bool,
    now: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let Some(referrer_id) = parse_referral_argument(argument) else {
        return Ok(false);
    };

    if referrer_id == entrant_id {
        tracing::debug!(entrant_id, "self-referral ignored");
        return Ok(false);
    }
    if entrant_was_known {
        return Ok(false);
    }

    if store.adopt_referrer(entrant_id, referrer_id).await? {
        store.increment_referral_count(referrer_id, now).await?;
        tracing::info!(referrer_id, referee_id = entrant_id, "referral credited");
        return Ok(true);
    }

    Ok(false)
}
