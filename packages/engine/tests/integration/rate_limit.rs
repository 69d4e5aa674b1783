use chrono::Duration;

use engine::store::EntitlementStore;

use crate::common::{TestGate, epoch};

#[tokio::test]
async fn second_entry_inside_the_cooldown_is_fully_inert() {
    let gate = TestGate::spawn();

    gate.entry(1, None).await.unwrap();
    gate.clock.advance(Duration::seconds(3));

    // Inside the cooldown there is no response and no mutation at all; not
    // even an unconditional unlock goes through.
    let decision = gate.entry(1, Some("unlock")).await;
    assert_eq!(decision, None);

    let record = gate.store.get(1).await.unwrap().unwrap();
    assert_eq!(record.expires_at, None);
    assert_eq!(record.referral_count, 0);
    assert_eq!(record.last_action_at, Some(epoch()));
}

#[tokio::test]
async fn throttled_referred_entry_credits_nobody() {
    let gate = TestGate::spawn();

    gate.entry(201, None).await.unwrap();
    gate.clock.advance(Duration::seconds(1));

    assert_eq!(gate.entry(201, Some("ref_1")).await, None);
    assert_eq!(gate.store.get(1).await.unwrap(), None);
}

#[tokio::test]
async fn cooldown_reopens_exactly_at_the_boundary() {
    let gate = TestGate::spawn();

    gate.entry(1, None).await.unwrap();

    gate.clock.advance(Duration::seconds(4));
    assert_eq!(gate.entry(1, None).await, None);

    gate.clock.advance(Duration::seconds(1));
    assert!(gate.entry(1, None).await.is_some());
}

#[tokio::test]
async fn cooldowns_are_per_user() {
    let gate = TestGate::spawn();

    gate.entry(1, None).await.unwrap();
    assert!(gate.entry(2, None).await.is_some());
}
