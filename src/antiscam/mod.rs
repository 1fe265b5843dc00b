//! AntiScam: wykrywanie scamu, podmiana wiadomości na "spowiedź" autora,
//! rejestr recydywy i stopniowane sankcje.

pub mod classifier;
pub mod commands;
pub mod ledger;
pub mod lexicon;
pub mod sanctions;

use std::path::Path;

use dashmap::DashMap;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::GuardResult;
use crate::transport::{quoted_content, AuditRecord, InboundMessage, Moderation, Transport};

use classifier::{Classifier, MIN_CHARS};
use ledger::OffenderLedger;
use lexicon::Lexicon;
use sanctions::{Escalator, SanctionTarget, SanctionTier};

pub const WEBHOOK_NAME: &str = "AntiScam System";
pub const AUDIT_CONTENT_CHARS: usize = 1000;
const AUDIT_COLOUR: u32 = 0xE74C3C;

/// Stan końcowy obsługi jednej wiadomości.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nie dotyczy (bot, DM, admin, za krótka) albo czysta treść.
    Passed,
    /// Podejrzana, ale nie udało się jej usunąć – nic dalej nie robimy.
    Aborted,
    Handled {
        attempt: u32,
        warning_level: u32,
        sanction: SanctionTier,
    },
}

pub struct AntiScam {
    classifier: Classifier,
    ledger: OffenderLedger,
    escalator: Escalator,
    confessions: Vec<String>,
    audit_channel: Option<u64>,
    default_role: Option<u64>,
    // /scammer-role – tylko w pamięci procesu
    role_overrides: DashMap<u64, u64>,
}

impl AntiScam {
    pub fn new(
        classifier: Classifier,
        ledger: OffenderLedger,
        escalator: Escalator,
        confessions: Vec<String>,
        audit_channel: Option<u64>,
        default_role: Option<u64>,
    ) -> Self {
        let confessions = if confessions.is_empty() {
            lexicon::default_confessions()
        } else {
            confessions
        };
        Self {
            classifier,
            ledger,
            escalator,
            confessions,
            audit_channel: audit_channel.filter(|id| *id != 0),
            default_role: default_role.filter(|id| *id != 0),
            role_overrides: DashMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> GuardResult<Self> {
        let cfg = &settings.antiscam;
        let classifier = Classifier::new(cfg.lexicon.clone())?;
        let ledger = OffenderLedger::open(Path::new(&settings.storage.data_dir).join(&cfg.db_file));
        let svc = Self::new(
            classifier,
            ledger,
            Escalator::new(cfg.suspend_seconds, cfg.ban_delete_days),
            cfg.confessions.clone(),
            settings.audit.channel_id,
            cfg.scammer_role_id,
        );
        let lex: &Lexicon = svc.classifier.lexicon();
        info!(
            high_risk = lex.high_risk.len(),
            keywords = lex.suspicious.len(),
            patterns = lex.patterns.len(),
            offenders = svc.ledger.len(),
            "AntiScam ready"
        );
        Ok(svc)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn ledger(&self) -> &OffenderLedger {
        &self.ledger
    }

    pub fn flagged_role(&self, guild_id: u64) -> Option<u64> {
        self.role_overrides
            .get(&guild_id)
            .map(|r| *r)
            .or(self.default_role)
    }

    pub fn set_flagged_role(&self, guild_id: u64, role_id: u64) {
        self.role_overrides.insert(guild_id, role_id);
    }

    fn pick_confession(&self) -> &str {
        self.confessions
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(lexicon::CONFESSIONS[0])
    }

    /// Cały pipeline dla jednej wiadomości. Każdy efekt uboczny jest izolowany;
    /// jedyna twarda zależność: bez usunięcia oryginału nie idziemy dalej.
    pub async fn process(
        &self,
        msg: &InboundMessage,
        transport: &dyn Transport,
        moderation: &dyn Moderation,
    ) -> Outcome {
        let Some(guild_id) = msg.guild_id else {
            return Outcome::Passed;
        };
        if msg.is_bot || msg.is_admin || msg.content.chars().count() < MIN_CHARS {
            return Outcome::Passed;
        }

        if !self.classifier.classify(&msg.content) {
            return Outcome::Passed;
        }
        debug!(user_id = msg.author_id, channel_id = msg.channel_id, "message flagged");

        if let Err(e) = transport.delete_message(msg.channel_id, msg.message_id).await {
            warn!(error = ?e, user_id = msg.author_id, "could not delete flagged message; aborting");
            return Outcome::Aborted;
        }

        let confession = self.pick_confession();
        match transport
            .send_as_display_identity(msg.channel_id, &msg.display_name, &msg.avatar_url, confession)
            .await
        {
            Ok(()) => info!(user = %msg.author_name, "flagged message replaced with confession"),
            Err(e) => warn!(error = ?e, user_id = msg.author_id, "confession send failed"),
        }

        let attempt = self.ledger.record_attempt(msg.author_id);
        let (escalated, level) = self.ledger.maybe_escalate(msg.author_id);
        let mut sanction = SanctionTier::None;
        if escalated {
            sanction = SanctionTier::from_level(level);
            info!(user_id = msg.author_id, level, tier = ?sanction, "warning level raised");
            self.escalator
                .apply(
                    sanction,
                    SanctionTarget {
                        guild_id,
                        user_id: msg.author_id,
                        flagged_role: self.flagged_role(guild_id),
                    },
                    moderation,
                )
                .await;
        }

        let warning_level = self.ledger.warning_level(msg.author_id);
        if let Some(ch) = self.audit_channel {
            let record = audit_record(msg, attempt, warning_level);
            if let Err(e) = transport.send_audit(ch, &record).await {
                warn!(error = ?e, "antiscam audit send failed");
            }
        }

        Outcome::Handled {
            attempt,
            warning_level,
            sanction,
        }
    }
}

fn audit_record(msg: &InboundMessage, attempt: u32, warning_level: u32) -> AuditRecord {
    AuditRecord::new(
        "🚨 Wykryto próbę oszustwa",
        "Wiadomość została usunięta i zastąpiona.",
        AUDIT_COLOUR,
    )
    .field(
        "Użytkownik",
        format!("<@{}> ({}, ID: {})", msg.author_id, msg.author_name, msg.author_id),
        false,
    )
    .field("Kanał", format!("<#{}>", msg.channel_id), true)
    .field("Próba nr", attempt.to_string(), true)
    .field("Poziom ostrzeżenia", warning_level.to_string(), true)
    .field(
        "Oryginalna wiadomość",
        quoted_content(&msg.content, AUDIT_CONTENT_CHARS),
        false,
    )
}
