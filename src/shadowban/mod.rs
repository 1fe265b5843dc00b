//! ShadowBan: wiadomości osób z listy znikają po cichu (albo są podmieniane
//! na bzdury), a kopia trafia do logów bezpieczeństwa.

pub mod commands;
pub mod registry;

use std::path::Path;

use rand::seq::IndexedRandom;
use tracing::{info, warn};

use crate::config::Settings;
use crate::transport::{quoted_content, AuditRecord, InboundMessage, Transport};

pub use registry::{ShadowEntry, ShadowMode, ShadowRegistry};

pub const WEBHOOK_NAME: &str = "ShadowBan System";
const AUDIT_COLOUR: u32 = 0x607D8B;
const AUDIT_CONTENT_CHARS: usize = 1000;

const NONSENSE: &[&str] = &[
    "Je ne comprends pas pourquoi personne ne répond à mes messages...",
    "Est-ce que quelqu'un peut me voir ?",
    "Bonjour ? Il y a quelqu'un ?",
    "Je pense que Discord a un problème aujourd'hui.",
    "Pourquoi personne ne me répond ?",
    "Je crois que mon message n'est pas passé.",
    "Internet est vraiment lent aujourd'hui.",
    "Est-ce que le serveur est down ?",
    "Je vais essayer de me reconnecter plus tard.",
    "Discord bug encore une fois...",
];

pub fn default_nonsense() -> Vec<String> {
    NONSENSE.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Autor nie jest na liście.
    NotListed,
    /// Na liście, ale usunięcie się nie udało.
    Failed,
    Suppressed(ShadowMode),
}

impl Suppression {
    /// Czy wiadomość została "zjedzona" i nie powinna iść dalej.
    pub fn consumed(self) -> bool {
        !matches!(self, Suppression::NotListed)
    }
}

pub struct ShadowBan {
    registry: ShadowRegistry,
    nonsense: Vec<String>,
    audit_channel: Option<u64>,
}

impl ShadowBan {
    pub fn new(registry: ShadowRegistry, nonsense: Vec<String>, audit_channel: Option<u64>) -> Self {
        let nonsense = if nonsense.is_empty() { default_nonsense() } else { nonsense };
        Self {
            registry,
            nonsense,
            audit_channel: audit_channel.filter(|id| *id != 0),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let registry = ShadowRegistry::open(
            Path::new(&settings.storage.data_dir).join(&settings.shadowban.db_file),
        );
        info!(listed = registry.len(), "ShadowBan ready");
        Self::new(
            registry,
            settings.shadowban.nonsense.clone(),
            settings.audit.channel_id,
        )
    }

    pub fn registry(&self) -> &ShadowRegistry {
        &self.registry
    }

    fn pick_nonsense(&self) -> &str {
        self.nonsense
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(NONSENSE[0])
    }

    pub async fn process(&self, msg: &InboundMessage, transport: &dyn Transport) -> Suppression {
        if msg.is_bot || msg.guild_id.is_none() {
            return Suppression::NotListed;
        }
        let Some(mode) = self.registry.mode(msg.author_id) else {
            return Suppression::NotListed;
        };

        if let Err(e) = transport.delete_message(msg.channel_id, msg.message_id).await {
            warn!(error = ?e, user_id = msg.author_id, "shadowban delete failed");
            return Suppression::Failed;
        }

        match mode {
            ShadowMode::Modify => {
                let line = self.pick_nonsense();
                match transport
                    .send_as_display_identity(msg.channel_id, &msg.display_name, &msg.avatar_url, line)
                    .await
                {
                    Ok(()) => info!(user = %msg.author_name, "shadowbanned message replaced"),
                    Err(e) => warn!(error = ?e, user_id = msg.author_id, "shadowban replacement failed"),
                }
            }
            ShadowMode::Delete | ShadowMode::Invisible => {
                info!(user = %msg.author_name, %mode, "shadowbanned message suppressed");
            }
        }

        if let Some(ch) = self.audit_channel {
            let record = AuditRecord::new(
                "🥷 Przechwycono wiadomość (shadowban)",
                "Wiadomość użytkownika z shadowbanem została przechwycona.",
                AUDIT_COLOUR,
            )
            .field(
                "Użytkownik",
                format!("<@{}> ({}, ID: {})", msg.author_id, msg.author_name, msg.author_id),
                false,
            )
            .field("Kanał", format!("<#{}>", msg.channel_id), true)
            .field("Tryb", mode.as_str(), true)
            .field("Treść", quoted_content(&msg.content, AUDIT_CONTENT_CHARS), false);
            if let Err(e) = transport.send_audit(ch, &record).await {
                warn!(error = ?e, "shadowban audit send failed");
            }
        }

        Suppression::Suppressed(mode)
    }
}
