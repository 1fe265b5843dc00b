mod common;

use common::{AUDIT, CHANNEL, Call, FakeDiscord, ROLE, antiscam, message};
use scamguard::antiscam::sanctions::SanctionTier;
use scamguard::antiscam::{AUDIT_CONTENT_CHARS, Outcome};

const SCAM: &str = "Gagne 500€ par jour avec ma méthode, contacte-moi en MP";

#[tokio::test]
async fn first_attempt_replaces_message_without_sanction() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec!["CONFESSION".into()]);
    let fake = FakeDiscord::new();

    let out = svc.process(&message(42, 1, SCAM), &fake, &fake).await;
    assert_eq!(
        out,
        Outcome::Handled {
            attempt: 1,
            warning_level: 0,
            sanction: SanctionTier::None
        }
    );

    let calls = fake.calls();
    assert_eq!(calls[0], Call::Delete { channel_id: CHANNEL, message_id: 1 });
    assert_eq!(
        calls[1],
        Call::Impersonate {
            channel_id: CHANNEL,
            display_name: "Display 42".into(),
            body: "CONFESSION".into()
        }
    );
    assert!(matches!(calls[2], Call::Audit { channel_id: AUDIT, .. }));
    assert_eq!(calls.len(), 3);

    let audit = &fake.audits()[0];
    assert_eq!(audit.field_value("Próba nr"), Some("1"));
    assert_eq!(audit.field_value("Poziom ostrzeżenia"), Some("0"));
    assert_eq!(audit.field_value("Kanał"), Some("<#600>"));
    assert!(fake.sanctions().is_empty());
}

#[tokio::test]
async fn third_attempt_grants_flagged_role() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    for i in 1..=2 {
        svc.process(&message(42, i, SCAM), &fake, &fake).await;
    }
    assert!(fake.sanctions().is_empty());

    let out = svc.process(&message(42, 3, SCAM), &fake, &fake).await;
    assert_eq!(
        out,
        Outcome::Handled {
            attempt: 3,
            warning_level: 1,
            sanction: SanctionTier::RoleGrant
        }
    );
    assert_eq!(fake.sanctions(), vec![Call::GrantRole { user_id: 42, role_id: ROLE }]);
}

#[tokio::test]
async fn sanctions_escalate_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    for i in 1..=9 {
        svc.process(&message(7, i, SCAM), &fake, &fake).await;
    }
    assert_eq!(
        fake.sanctions(),
        vec![
            Call::GrantRole { user_id: 7, role_id: ROLE },
            Call::Suspend { user_id: 7, secs: 3600 },
            Call::Ban { user_id: 7, delete_days: 1 },
        ]
    );
    assert_eq!(svc.ledger().warning_level(7), 3);
}

#[tokio::test]
async fn offenders_are_tracked_separately() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    svc.process(&message(1, 1, SCAM), &fake, &fake).await;
    svc.process(&message(1, 2, SCAM), &fake, &fake).await;
    svc.process(&message(2, 3, SCAM), &fake, &fake).await;

    assert_eq!(svc.ledger().record(1).unwrap().attempt_count, 2);
    assert_eq!(svc.ledger().record(2).unwrap().attempt_count, 1);
}

#[tokio::test]
async fn failed_removal_stops_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::failing_delete();

    let out = svc.process(&message(42, 1, SCAM), &fake, &fake).await;
    assert_eq!(out, Outcome::Aborted);
    assert!(fake.calls().is_empty());
    assert!(svc.ledger().record(42).is_none());
}

#[tokio::test]
async fn failed_confession_still_counts_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();
    fake.fail_send.store(true, std::sync::atomic::Ordering::SeqCst);

    let out = svc.process(&message(42, 1, SCAM), &fake, &fake).await;
    assert!(matches!(out, Outcome::Handled { attempt: 1, .. }));
    assert_eq!(fake.audits().len(), 1);
}

#[tokio::test]
async fn clean_and_exempt_messages_pass() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    let clean = message(1, 1, "Salut tout le monde, bonne soirée !");
    assert_eq!(svc.process(&clean, &fake, &fake).await, Outcome::Passed);

    let mut bot = message(2, 2, SCAM);
    bot.is_bot = true;
    assert_eq!(svc.process(&bot, &fake, &fake).await, Outcome::Passed);

    let mut admin = message(3, 3, SCAM);
    admin.is_admin = true;
    assert_eq!(svc.process(&admin, &fake, &fake).await, Outcome::Passed);

    let mut dm = message(4, 4, SCAM);
    dm.guild_id = None;
    assert_eq!(svc.process(&dm, &fake, &fake).await, Outcome::Passed);

    let short = message(5, 5, "$$");
    assert_eq!(svc.process(&short, &fake, &fake).await, Outcome::Passed);

    assert!(fake.calls().is_empty());
    assert!(svc.ledger().is_empty());
}

#[tokio::test]
async fn audit_content_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    let long = format!("paypal {}", "x".repeat(3000));
    svc.process(&message(9, 1, &long), &fake, &fake).await;

    let audit = &fake.audits()[0];
    let body = audit.field_value("Oryginalna wiadomość").unwrap();
    let inner = body.trim_start_matches("```").trim_end_matches("```");
    assert_eq!(inner.chars().count(), AUDIT_CONTENT_CHARS);
}

#[tokio::test]
async fn reset_clears_history() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    for i in 1..=3 {
        svc.process(&message(42, i, SCAM), &fake, &fake).await;
    }
    assert!(svc.ledger().reset(42));
    assert!(svc.ledger().record(42).is_none());

    fake.clear();
    let out = svc.process(&message(42, 4, SCAM), &fake, &fake).await;
    assert!(matches!(out, Outcome::Handled { attempt: 1, warning_level: 0, .. }));
}

#[tokio::test]
async fn role_override_wins_over_default() {
    let dir = tempfile::tempdir().unwrap();
    let svc = antiscam(dir.path(), vec![]);
    let fake = FakeDiscord::new();

    svc.set_flagged_role(common::GUILD, 999);
    for i in 1..=3 {
        svc.process(&message(42, i, SCAM), &fake, &fake).await;
    }
    assert_eq!(fake.sanctions(), vec![Call::GrantRole { user_id: 42, role_id: 999 }]);
    assert_eq!(svc.flagged_role(12345), Some(ROLE));
}

#[tokio::test]
async fn ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeDiscord::new();
    {
        let svc = antiscam(dir.path(), vec![]);
        svc.process(&message(42, 1, SCAM), &fake, &fake).await;
        svc.process(&message(42, 2, SCAM), &fake, &fake).await;
    }
    let svc = antiscam(dir.path(), vec![]);
    let out = svc.process(&message(42, 3, SCAM), &fake, &fake).await;
    assert!(matches!(out, Outcome::Handled { attempt: 3, warning_level: 1, .. }));
}
