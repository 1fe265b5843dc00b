#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use scamguard::antiscam::AntiScam;
use scamguard::antiscam::classifier::Classifier;
use scamguard::antiscam::ledger::OffenderLedger;
use scamguard::antiscam::lexicon::Lexicon;
use scamguard::antiscam::sanctions::Escalator;
use scamguard::error::{GuardError, GuardResult};
use scamguard::transport::{AuditRecord, InboundMessage, Moderation, Transport};

pub const GUILD: u64 = 500;
pub const CHANNEL: u64 = 600;
pub const AUDIT: u64 = 700;
pub const ROLE: u64 = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete { channel_id: u64, message_id: u64 },
    Impersonate { channel_id: u64, display_name: String, body: String },
    Audit { channel_id: u64, record: AuditRecord },
    GrantRole { user_id: u64, role_id: u64 },
    RevokeRole { user_id: u64, role_id: u64 },
    Suspend { user_id: u64, secs: u64 },
    Ban { user_id: u64, delete_days: u8 },
}

/// Atrapa Discorda: zapisuje każde wywołanie po kolei.
#[derive(Default)]
pub struct FakeDiscord {
    pub calls: Mutex<Vec<Call>>,
    pub fail_delete: AtomicBool,
    pub fail_send: AtomicBool,
}

impl FakeDiscord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_delete() -> Self {
        let f = Self::default();
        f.fail_delete.store(true, Ordering::SeqCst);
        f
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, c: Call) {
        self.calls.lock().unwrap().push(c);
    }

    pub fn audits(&self) -> Vec<AuditRecord> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Audit { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn sanctions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::GrantRole { .. } | Call::Suspend { .. } | Call::Ban { .. }
                )
            })
            .collect()
    }
}

#[async_trait]
impl Transport for FakeDiscord {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> GuardResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(GuardError::Transport("missing permissions".into()));
        }
        self.push(Call::Delete { channel_id, message_id });
        Ok(())
    }

    async fn send_as_display_identity(
        &self,
        channel_id: u64,
        display_name: &str,
        _avatar_url: &str,
        body: &str,
    ) -> GuardResult<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(GuardError::Transport("webhook gone".into()));
        }
        self.push(Call::Impersonate {
            channel_id,
            display_name: display_name.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_audit(&self, channel_id: u64, record: &AuditRecord) -> GuardResult<()> {
        self.push(Call::Audit {
            channel_id,
            record: record.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl Moderation for FakeDiscord {
    async fn grant_role(&self, _g: u64, user_id: u64, role_id: u64, _reason: &str) -> GuardResult<()> {
        self.push(Call::GrantRole { user_id, role_id });
        Ok(())
    }

    async fn revoke_role(&self, _g: u64, user_id: u64, role_id: u64, _reason: &str) -> GuardResult<()> {
        self.push(Call::RevokeRole { user_id, role_id });
        Ok(())
    }

    async fn suspend(&self, _g: u64, user_id: u64, duration: Duration, _reason: &str) -> GuardResult<()> {
        self.push(Call::Suspend {
            user_id,
            secs: duration.as_secs(),
        });
        Ok(())
    }

    async fn ban(&self, _g: u64, user_id: u64, _reason: &str, delete_message_days: u8) -> GuardResult<()> {
        self.push(Call::Ban {
            user_id,
            delete_days: delete_message_days,
        });
        Ok(())
    }
}

pub fn message(author_id: u64, message_id: u64, content: &str) -> InboundMessage {
    InboundMessage {
        guild_id: Some(GUILD),
        channel_id: CHANNEL,
        message_id,
        author_id,
        author_name: format!("user{author_id}"),
        display_name: format!("Display {author_id}"),
        avatar_url: "https://cdn.discordapp.com/embed/avatars/0.png".into(),
        is_bot: false,
        is_admin: false,
        content: content.to_string(),
    }
}

pub fn antiscam(dir: &std::path::Path, confessions: Vec<String>) -> AntiScam {
    AntiScam::new(
        Classifier::new(Lexicon::default()).unwrap(),
        OffenderLedger::open(dir.join("antiscam_db.json")),
        Escalator::default(),
        confessions,
        Some(AUDIT),
        Some(ROLE),
    )
}
