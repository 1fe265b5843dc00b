// src/discord/mod.rs
pub mod access;
pub mod gateway;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures_util::FutureExt;
use serenity::all::*;
use serenity::async_trait;

use crate::antiscam::{self, commands::AntiScamCommands, Outcome};
use crate::shadowban::{self, commands::ShadowBanCommands};
use crate::transport::InboundMessage;
use crate::AppContext;
use gateway::SerenityGateway;

pub struct Handler {
    pub app: Arc<AppContext>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Logged in as {}", ready.user.name);

        for g in ready.guilds {
            if let Err(e) = register_commands_for_guild(&ctx, g.id).await {
                tracing::warn!(error=?e, gid=%g.id.get(), "register_commands_for_guild failed (wrapper)");
            }
        }
    }

    // _is_new zgodnie z Serenity 0.12
    async fn guild_create(&self, ctx: Context, guild: Guild, _is_new: Option<bool>) {
        let gid = guild.id.get();
        if let Err(e) = register_commands_for_guild(&ctx, guild.id).await {
            tracing::warn!(error=?e, gid, "register_commands_for_guild failed (on guild_create)");
        }
        tracing::info!(guild=%guild.name, gid, "commands registered (see warnings if any failed)");
    }

    /// Brama interakcji: tylko slash
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let started = Instant::now();
        let name = interaction.as_command().map(|c| c.data.name.clone());

        let fut = async {
            AntiScamCommands::on_interaction(&ctx, &self.app, interaction.clone()).await;
            ShadowBanCommands::on_interaction(&ctx, &self.app, interaction).await;
        };

        let result = AssertUnwindSafe(fut).catch_unwind().await;

        if let Some(name) = name {
            match result {
                Ok(()) => tracing::debug!(command=%name, elapsed_ms=started.elapsed().as_millis() as u64, "command done"),
                Err(_) => tracing::error!(command=%name, "command handler panicked"),
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let inbound = inbound_from(&ctx, &msg);
        if inbound.guild_id.is_none() || inbound.is_bot {
            return;
        }

        // ShadowBan ma pierwszeństwo: zjedzona wiadomość nie trafia do AntiScam
        let sb_gateway = SerenityGateway::new(&ctx, shadowban::WEBHOOK_NAME);
        if self.app.shadowban.process(&inbound, &sb_gateway).await.consumed() {
            return;
        }

        let gw = SerenityGateway::new(&ctx, antiscam::WEBHOOK_NAME);
        if let Outcome::Handled { attempt, warning_level, sanction } =
            self.app.antiscam.process(&inbound, &gw, &gw).await
        {
            tracing::info!(
                user_id = inbound.author_id,
                attempt,
                warning_level,
                sanction = sanction.label(),
                "scam attempt handled"
            );
        }
    }
}

/// Spłaszcza `Message` do tego, czego potrzebuje rdzeń.
fn inbound_from(ctx: &Context, msg: &Message) -> InboundMessage {
    let display_name = msg
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .unwrap_or_else(|| msg.author.display_name().to_string());

    let is_admin = msg.guild_id.is_some_and(|gid| {
        access::is_admin(
            &ctx.cache,
            gid,
            msg.author.id,
            msg.member.as_ref().map(|m| m.roles.as_slice()),
        )
    });

    InboundMessage {
        guild_id: msg.guild_id.map(|g| g.get()),
        channel_id: msg.channel_id.get(),
        message_id: msg.id.get(),
        author_id: msg.author.id.get(),
        author_name: msg.author.name.clone(),
        display_name,
        avatar_url: msg.author.face(),
        is_bot: msg.author.bot || msg.webhook_id.is_some(),
        is_admin,
        content: msg.content.clone(),
    }
}

pub fn intents_from_settings(names: &[String]) -> GatewayIntents {
    let mut i = GatewayIntents::empty();
    for n in names {
        match n.as_str() {
            "GUILDS" => i |= GatewayIntents::GUILDS,
            "GUILD_MEMBERS" => i |= GatewayIntents::GUILD_MEMBERS,
            "GUILD_MESSAGES" => i |= GatewayIntents::GUILD_MESSAGES,
            "GUILD_WEBHOOKS" => i |= GatewayIntents::GUILD_WEBHOOKS,
            "MESSAGE_CONTENT" => i |= GatewayIntents::MESSAGE_CONTENT,
            other => tracing::warn!(intent = other, "unknown gateway intent ignored"),
        }
    }
    i
}

/// Intents z konfiguracji; pusta lista → domyślne. GUILDS jest wymuszane,
/// bo bez cache gildii nie rozpoznamy adminów.
pub fn resolve_intents(names: &[String]) -> GatewayIntents {
    let intents = intents_from_settings(names);
    if intents.is_empty() {
        return crate::default_gateway_intents();
    }
    if !intents.contains(GatewayIntents::GUILDS) {
        tracing::warn!("discord.intents has no GUILDS; adding it (needed for admin detection)");
    }
    intents | GatewayIntents::GUILDS
}

pub async fn run_bot(ctx: Arc<AppContext>) -> Result<()> {
    let token = &ctx.settings.discord.token;
    if token.is_empty() {
        anyhow::bail!("Brak tokenu Discord (SCG_DISCORD__TOKEN albo DISCORD_TOKEN). Uzupełnij w .env.");
    }

    let intents = resolve_intents(&ctx.settings.discord.intents);

    let handler = Handler { app: ctx.clone() };

    let mut client = serenity::Client::builder(token, intents)
        .event_handler(handler)
        .await?;

    tracing::info!("Discord client starting…");
    client.start().await?;
    Ok(())
}

/* ============================================================
   REJESTR KOMEND
   ============================================================ */
async fn register_commands_for_guild(ctx: &Context, guild_id: GuildId) -> Result<()> {
    if let Err(e) = AntiScamCommands::register_commands(ctx, guild_id).await {
        tracing::warn!(error=?e, gid=%guild_id.get(), "register antiscam failed");
    }
    if let Err(e) = ShadowBanCommands::register_commands(ctx, guild_id).await {
        tracing::warn!(error=?e, gid=%guild_id.get(), "register shadowban failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_parse_known_names() {
        let names = vec!["GUILDS".to_string(), "MESSAGE_CONTENT".to_string(), "NOPE".to_string()];
        let i = intents_from_settings(&names);
        assert!(i.contains(GatewayIntents::GUILDS));
        assert!(i.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!i.contains(GatewayIntents::GUILD_MEMBERS));
    }

    #[test]
    fn guilds_intent_is_always_present() {
        let names = vec!["GUILD_MESSAGES".to_string(), "MESSAGE_CONTENT".to_string()];
        let i = resolve_intents(&names);
        assert!(i.contains(GatewayIntents::GUILDS));
        assert!(i.contains(GatewayIntents::GUILD_MESSAGES));
        assert_eq!(resolve_intents(&[]), crate::default_gateway_intents());
    }
}
