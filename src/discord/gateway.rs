//! Implementacja `Transport` + `Moderation` na serenity (HTTP API Discorda).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serenity::all::{
    Cache, ChannelId, ChannelType, Colour, Context, CreateAllowedMentions, CreateEmbed,
    CreateEmbedFooter, CreateMessage, CreateWebhook, EditMember, ExecuteWebhook, GuildId, Http,
    MessageId, RoleId, Timestamp, UserId, Webhook,
};
use tracing::{debug, info, warn};

use crate::error::{GuardError, GuardResult};
use crate::transport::{clip, AuditRecord, Moderation, Transport};

const BRAND_FOOTER: &str = "Tigris ScamGuard • Security Log";
/// Limit Discorda na nazwę użytkownika webhooka.
const WEBHOOK_USERNAME_MAX: usize = 80;

// (kanał, nazwa webhooka) -> webhook; unikamy GET /webhooks przy każdej wiadomości
static WEBHOOKS: Lazy<DashMap<(u64, &'static str), Webhook>> = Lazy::new(DashMap::new);

#[derive(Clone)]
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
    webhook_name: &'static str,
}

impl SerenityGateway {
    pub fn new(ctx: &Context, webhook_name: &'static str) -> Self {
        Self {
            http: ctx.http.clone(),
            cache: ctx.cache.clone(),
            webhook_name,
        }
    }

    async fn webhook_for(&self, channel_id: u64) -> GuardResult<Webhook> {
        if let Some(hook) = WEBHOOKS.get(&(channel_id, self.webhook_name)) {
            return Ok(hook.clone());
        }

        let ch = ChannelId::new(channel_id);
        let existing = ch
            .webhooks(&self.http)
            .await?
            .into_iter()
            .find(|w| w.name.as_deref() == Some(self.webhook_name));

        let hook = match existing {
            Some(w) => w,
            None => {
                let w = ch
                    .create_webhook(&self.http, CreateWebhook::new(self.webhook_name))
                    .await?;
                info!(channel_id, name = self.webhook_name, "webhook created");
                w
            }
        };
        WEBHOOKS.insert((channel_id, self.webhook_name), hook.clone());
        Ok(hook)
    }

    async fn execute_as(
        &self,
        hook: &Webhook,
        display_name: &str,
        avatar_url: &str,
        body: &str,
    ) -> GuardResult<()> {
        let mut builder = ExecuteWebhook::new()
            .content(body)
            .username(webhook_username(display_name))
            .allowed_mentions(CreateAllowedMentions::new());
        if !avatar_url.is_empty() {
            builder = builder.avatar_url(avatar_url);
        }
        hook.execute(&self.http, false, builder).await?;
        Ok(())
    }
}

fn webhook_username(display_name: &str) -> String {
    let name = clip(display_name.trim(), WEBHOOK_USERNAME_MAX);
    if name.is_empty() {
        "Utilisateur".to_string()
    } else {
        name
    }
}

#[async_trait]
impl Transport for SerenityGateway {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> GuardResult<()> {
        ChannelId::new(channel_id)
            .delete_message(&self.http, MessageId::new(message_id))
            .await?;
        Ok(())
    }

    async fn send_as_display_identity(
        &self,
        channel_id: u64,
        display_name: &str,
        avatar_url: &str,
        body: &str,
    ) -> GuardResult<()> {
        let hook = self.webhook_for(channel_id).await?;
        if let Err(e) = self.execute_as(&hook, display_name, avatar_url, body).await {
            // webhook mógł zostać usunięty ręcznie – jedna próba z nowym
            debug!(error = ?e, channel_id, "cached webhook failed, refreshing");
            WEBHOOKS.remove(&(channel_id, self.webhook_name));
            let hook = self.webhook_for(channel_id).await?;
            self.execute_as(&hook, display_name, avatar_url, body).await?;
        }
        Ok(())
    }

    async fn send_audit(&self, channel_id: u64, record: &AuditRecord) -> GuardResult<()> {
        let mut embed = CreateEmbed::new()
            .title(&record.title)
            .description(&record.description)
            .colour(Colour::new(record.colour))
            .timestamp(Timestamp::now())
            .footer(CreateEmbedFooter::new(BRAND_FOOTER));
        for f in &record.fields {
            embed = embed.field(&f.name, &f.value, f.inline);
        }
        ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Moderation for SerenityGateway {
    async fn grant_role(&self, guild_id: u64, user_id: u64, role_id: u64, reason: &str) -> GuardResult<()> {
        let gid = GuildId::new(guild_id);
        let uid = UserId::new(user_id);
        let rid = RoleId::new(role_id);

        let role_exists = self.cache.guild(gid).map(|g| g.roles.contains_key(&rid));
        if role_exists == Some(false) {
            debug!(guild_id, role_id, "configured role not found in guild; skipping");
            return Ok(());
        }

        let member = gid.member(&self.http, uid).await?;
        if member.roles.contains(&rid) {
            return Ok(());
        }
        self.http.add_member_role(gid, uid, rid, Some(reason)).await?;
        Ok(())
    }

    async fn revoke_role(&self, guild_id: u64, user_id: u64, role_id: u64, reason: &str) -> GuardResult<()> {
        let gid = GuildId::new(guild_id);
        let uid = UserId::new(user_id);
        let rid = RoleId::new(role_id);

        let member = gid.member(&self.http, uid).await?;
        if !member.roles.contains(&rid) {
            return Ok(());
        }
        self.http.remove_member_role(gid, uid, rid, Some(reason)).await?;
        Ok(())
    }

    async fn suspend(&self, guild_id: u64, user_id: u64, duration: Duration, reason: &str) -> GuardResult<()> {
        let until_unix = Utc::now().timestamp() + duration.as_secs() as i64;
        let until = Timestamp::from_unix_timestamp(until_unix)
            .map_err(|e| GuardError::Transport(format!("bad timeout timestamp: {e}")))?;
        GuildId::new(guild_id)
            .edit_member(
                &self.http,
                UserId::new(user_id),
                EditMember::new()
                    .disable_communication_until_datetime(until)
                    .audit_log_reason(reason),
            )
            .await?;
        Ok(())
    }

    async fn ban(&self, guild_id: u64, user_id: u64, reason: &str, delete_message_days: u8) -> GuardResult<()> {
        GuildId::new(guild_id)
            .ban_with_reason(&self.http, UserId::new(user_id), delete_message_days, reason)
            .await?;
        Ok(())
    }
}

/// Usuwa nasze webhooki (po nazwie) ze wszystkich kanałów tekstowych gildii.
pub async fn clean_webhooks(http: &Http, guild_id: GuildId, names: &[&str]) -> GuardResult<usize> {
    let channels = guild_id.channels(http).await?;
    let mut removed = 0usize;
    for (cid, ch) in channels {
        if ch.kind != ChannelType::Text && ch.kind != ChannelType::News {
            continue;
        }
        let hooks = match cid.webhooks(http).await {
            Ok(h) => h,
            Err(e) => {
                warn!(error = ?e, channel = %ch.name, "could not list webhooks");
                continue;
            }
        };
        for hook in hooks {
            let Some(name) = hook.name.as_deref() else {
                continue;
            };
            if !names.contains(&name) {
                continue;
            }
            match hook.delete(http).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(error = ?e, channel = %ch.name, "webhook delete failed"),
            }
        }
        WEBHOOKS.retain(|(c, _), _| *c != cid.get());
    }
    info!(guild_id = guild_id.get(), removed, "webhooks cleaned");
    Ok(removed)
}
