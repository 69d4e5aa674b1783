use chrono::Duration;

use engine::models::{ArtifactKind, Decision, Remaining};

use crate::common::{BOT_USERNAME, TestGate, UNLOCK_URL};

mod delivery {
    use super::*;

    #[tokio::test]
    async fn unlocked_user_receives_the_artifact_copy_protected() {
        let gate = TestGate::spawn();
        let code = gate.upload_video("file-123").await;

        gate.entry(1, Some("unlock")).await.unwrap();
        gate.clock.advance(Duration::minutes(90));

        match gate.entry(1, Some(&code)).await.unwrap() {
            Decision::Deliver {
                code: delivered,
                kind,
                locator,
                remaining,
                copy_protected,
                streaming_hint,
            } => {
                assert_eq!(delivered, code);
                assert_eq!(kind, ArtifactKind::Video);
                assert_eq!(locator, "file-123");
                assert_eq!(remaining, Remaining { hours: 1, minutes: 30 });
                assert!(copy_protected);
                assert!(streaming_hint);
            }
            other => panic!("expected Deliver, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_code_reports_not_found_without_mutation() {
        let gate = TestGate::spawn();
        gate.upload_video("file-123").await;

        gate.entry(1, Some("unlock")).await.unwrap();
        gate.advance_past_cooldown();

        let decision = gate.entry(1, Some("ffffffff")).await.unwrap();
        assert_eq!(decision, Decision::NotFound);
    }
}

mod locked_prompt {
    use super::*;

    #[tokio::test]
    async fn locked_user_gets_unlock_and_referral_buttons() {
        let gate = TestGate::spawn();
        let code = gate.upload_video("file-123").await;

        match gate.entry(1, Some(&code)).await.unwrap() {
            Decision::LockedPrompt {
                referral_count,
                referral_required,
                buttons,
            } => {
                assert_eq!(referral_count, 0);
                assert_eq!(referral_required, 3);
                assert_eq!(buttons.len(), 2);
                assert_eq!(buttons[0].url, UNLOCK_URL);
                assert_eq!(
                    buttons[1].url,
                    format!("https://t.me/{BOT_USERNAME}?start=ref_1")
                );
            }
            other => panic!("expected LockedPrompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn prompt_shows_partial_referral_progress() {
        let gate = TestGate::spawn();
        let code = gate.upload_video("file-123").await;

        gate.refer(1, 101).await;
        gate.refer(1, 102).await;

        gate.advance_past_cooldown();
        match gate.entry(1, Some(&code)).await.unwrap() {
            Decision::LockedPrompt { referral_count, .. } => {
                assert_eq!(referral_count, 2);
            }
            other => panic!("expected LockedPrompt, got {other:?}"),
        }
    }
}

mod codes {
    use super::*;
    use engine::store::ArtifactStore;

    #[tokio::test]
    async fn uploads_yield_distinct_well_formed_codes() {
        let gate = TestGate::spawn();

        let mut seen = std::collections::HashSet::new();
        for i in 0..16 {
            let code = gate.upload_video(&format!("file-{i}")).await;
            assert_eq!(code.len(), 8);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
            );
            assert!(seen.insert(code), "duplicate access code");
        }

        assert_eq!(gate.store.count().await.unwrap(), 16);
    }

    #[tokio::test]
    async fn lookup_returns_exactly_the_artifact_stored_under_the_code() {
        let gate = TestGate::spawn();
        let first = gate.upload_video("file-a").await;
        let second = gate.upload_video("file-b").await;

        gate.entry(1, Some("unlock")).await.unwrap();
        gate.advance_past_cooldown();

        match gate.entry(1, Some(&second)).await.unwrap() {
            Decision::Deliver { locator, .. } => assert_eq!(locator, "file-b"),
            other => panic!("expected Deliver, got {other:?}"),
        }

        gate.advance_past_cooldown();
        match gate.entry(1, Some(&first)).await.unwrap() {
            Decision::Deliver { locator, .. } => assert_eq!(locator, "file-a"),
            other => panic!("expected Deliver, got {other:?}"),
        }
    }
}
