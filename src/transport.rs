//! Granica między logiką moderacji a Discordem.
//! Rdzeń (AntiScam, ShadowBan) widzi tylko te traity; implementacja na
//! serenity siedzi w `discord::gateway`, a testy podstawiają atrapy.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::GuardResult;

/// Wiadomość przychodząca, już spłaszczona z eventu gateway.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub display_name: String,
    pub avatar_url: String,
    /// Bot albo webhook (w tym nasze własne podmienione wiadomości).
    pub is_bot: bool,
    /// Autor ma uprawnienie Administrator na serwerze.
    pub is_admin: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Wpis do kanału logów bezpieczeństwa (renderowany jako embed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub title: String,
    pub description: String,
    pub colour: u32,
    pub fields: Vec<AuditField>,
}

impl AuditRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>, colour: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            colour,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(AuditField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Przycina po znakach (nie bajtach), bez wielokropka.
pub fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Treść wiadomości do embeda: blok kodu albo placeholder dla pustej.
pub fn quoted_content(content: &str, max_chars: usize) -> String {
    if content.is_empty() {
        "*Brak treści tekstowej*".to_string()
    } else {
        format!("```{}```", clip(content, max_chars))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> GuardResult<()>;

    /// Wiadomość wyglądająca jak wysłana przez wskazaną osobę (nazwa + avatar).
    /// Wzmianki są zawsze wyłączone.
    async fn send_as_display_identity(
        &self,
        channel_id: u64,
        display_name: &str,
        avatar_url: &str,
        body: &str,
    ) -> GuardResult<()>;

    async fn send_audit(&self, channel_id: u64, record: &AuditRecord) -> GuardResult<()>;
}

#[async_trait]
pub trait Moderation: Send + Sync {
    /// No-op, jeśli roli nie ma na serwerze albo użytkownik już ją ma.
    async fn grant_role(&self, guild_id: u64, user_id: u64, role_id: u64, reason: &str) -> GuardResult<()>;

    async fn revoke_role(&self, guild_id: u64, user_id: u64, role_id: u64, reason: &str) -> GuardResult<()>;

    async fn suspend(&self, guild_id: u64, user_id: u64, duration: Duration, reason: &str) -> GuardResult<()>;

    async fn ban(&self, guild_id: u64, user_id: u64, reason: &str, delete_message_days: u8) -> GuardResult<()>;
}
