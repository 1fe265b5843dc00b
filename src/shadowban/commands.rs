use anyhow::Result;
use serenity::all::{
    Colour, CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateEmbedFooter, GuildId, Interaction, Permissions,
};
use tracing::{info, warn};

use super::registry::ShadowMode;
use crate::discord::access::{
    bot_can_manage_webhooks, invoker_is_admin, is_admin_member, opt_str, opt_user, respond_embed,
    respond_text,
};
use crate::discord::gateway::clean_webhooks;
use crate::AppContext;

const SYSTEM_NAME: &str = "Tigris ScamGuard • ShadowBan";

fn mode_option(required: bool) -> CreateCommandOption {
    let mut opt = CreateCommandOption::new(CommandOptionType::String, "mode", "Tryb shadowbana")
        .required(required);
    for m in ShadowMode::ALL {
        opt = opt.add_string_choice(m.as_str(), m.as_str());
    }
    opt
}

fn mode_label(mode: ShadowMode) -> &'static str {
    match mode {
        ShadowMode::Delete => "🗑️ delete: wiadomości znikają",
        ShadowMode::Modify => "✏️ modify: wiadomości podmieniane na bzdury",
        ShadowMode::Invisible => "👻 invisible: wiadomości znikają bez śladu",
    }
}

pub struct ShadowBanCommands;

impl ShadowBanCommands {
    /// Definicje wszystkich komend modułu (rejestrowane per gildia).
    pub fn command_definitions() -> Vec<CreateCommand> {
        vec![
            CreateCommand::new("shadowban")
                .description("Nałóż shadowbana na użytkownika")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::User, "user", "Użytkownik")
                        .required(true),
                )
                .add_option(mode_option(false))
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("unshadowban")
                .description("Zdejmij shadowbana")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::User, "user", "Użytkownik")
                        .required(true),
                )
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("shadowbanned")
                .description("Lista użytkowników z shadowbanem")
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("shadowban-mode")
                .description("Zmień tryb istniejącego shadowbana")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::User, "user", "Użytkownik")
                        .required(true),
                )
                .add_option(mode_option(true))
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("clean-webhooks")
                .description("Usuń webhooki systemu ze wszystkich kanałów")
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("shadowban-help")
                .description("Jak działa shadowban")
                .default_member_permissions(Permissions::ADMINISTRATOR),
        ]
    }

    pub async fn register_commands(ctx: &Context, gid: GuildId) -> Result<()> {
        for cmd in Self::command_definitions() {
            gid.create_command(&ctx.http, cmd).await?;
        }
        Ok(())
    }

    pub async fn on_interaction(ctx: &Context, app: &AppContext, interaction: Interaction) {
        let Some(cmd) = interaction.command() else {
            return;
        };
        let res = match cmd.data.name.as_str() {
            "shadowban" => handle_ban(ctx, app, &cmd).await,
            "unshadowban" => handle_unban(ctx, app, &cmd).await,
            "shadowbanned" => handle_list(ctx, app, &cmd).await,
            "shadowban-mode" => handle_mode(ctx, app, &cmd).await,
            "clean-webhooks" => handle_clean(ctx, &cmd).await,
            "shadowban-help" => respond_embed(ctx, &cmd, help_embed()).await,
            _ => return,
        };
        if let Err(e) = res {
            warn!(error = ?e, command = %cmd.data.name, "shadowban command failed");
        }
    }
}

fn parse_mode(cmd: &CommandInteraction) -> std::result::Result<Option<ShadowMode>, String> {
    opt_str(cmd, "mode").map(|s| s.parse::<ShadowMode>()).transpose()
}

async fn handle_ban(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let Some(gid) = cmd.guild_id else {
        return respond_text(ctx, cmd, "Użyj na serwerze.").await;
    };
    let Some(uid) = opt_user(cmd, "user") else {
        return respond_text(ctx, cmd, "Wskaż użytkownika.").await;
    };
    let mode = match parse_mode(cmd) {
        Ok(m) => m.unwrap_or_default(),
        Err(e) => return respond_text(ctx, cmd, &format!("❌ {e}")).await,
    };

    // admin może zbanować tylko samego siebie (do testów)
    if uid != cmd.user.id && is_admin_member(ctx, gid, uid).await {
        return respond_text(ctx, cmd, "❌ Nie można nałożyć shadowbana na administratora.").await;
    }
    if mode == ShadowMode::Modify && !bot_can_manage_webhooks(ctx, gid) {
        return respond_text(
            ctx,
            cmd,
            "❌ Tryb `modify` wymaga uprawnienia **Zarządzanie webhookami** dla bota.",
        )
        .await;
    }

    app.shadowban.registry().ban(uid.get(), mode, cmd.user.id.get());
    info!(target_id = uid.get(), by = cmd.user.id.get(), %mode, "shadowban applied");

    respond_text(
        ctx,
        cmd,
        &format!("✅ <@{}> ma teraz shadowbana.\nTryb: {}", uid.get(), mode_label(mode)),
    )
    .await
}

async fn handle_unban(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let Some(uid) = opt_user(cmd, "user") else {
        return respond_text(ctx, cmd, "Wskaż użytkownika.").await;
    };
    if app.shadowban.registry().unban(uid.get()) {
        info!(target_id = uid.get(), by = cmd.user.id.get(), "shadowban lifted");
        respond_text(ctx, cmd, &format!("✅ Zdjęto shadowbana z <@{}>.", uid.get())).await
    } else {
        respond_text(ctx, cmd, &format!("ℹ️ <@{}> nie ma shadowbana.", uid.get())).await
    }
}

async fn handle_list(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let entries = app.shadowban.registry().list();
    if entries.is_empty() {
        return respond_text(ctx, cmd, "✅ Nikt nie ma shadowbana.").await;
    }

    let mut e = CreateEmbed::new()
        .title("🥷 Użytkownicy z shadowbanem")
        .colour(Colour::new(0x607D8B))
        .footer(CreateEmbedFooter::new(format!(
            "Łącznie: {} • {SYSTEM_NAME}",
            entries.len()
        )));
    // limit pól w embedzie
    for (uid, entry) in entries.iter().take(25) {
        let by = if entry.banned_by == 0 {
            "?".to_string()
        } else {
            format!("<@{}>", entry.banned_by)
        };
        e = e.field(
            format!("ID {uid}"),
            format!(
                "<@{uid}>\nTryb: `{}`\nOd: <t:{}:R> • przez {by}",
                entry.mode,
                entry.timestamp.timestamp()
            ),
            true,
        );
    }
    respond_embed(ctx, cmd, e).await
}

async fn handle_mode(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let Some(gid) = cmd.guild_id else {
        return respond_text(ctx, cmd, "Użyj na serwerze.").await;
    };
    let Some(uid) = opt_user(cmd, "user") else {
        return respond_text(ctx, cmd, "Wskaż użytkownika.").await;
    };
    let mode = match parse_mode(cmd) {
        Ok(Some(m)) => m,
        Ok(None) => return respond_text(ctx, cmd, "Wskaż tryb.").await,
        Err(e) => return respond_text(ctx, cmd, &format!("❌ {e}")).await,
    };
    if mode == ShadowMode::Modify && !bot_can_manage_webhooks(ctx, gid) {
        return respond_text(
            ctx,
            cmd,
            "❌ Tryb `modify` wymaga uprawnienia **Zarządzanie webhookami** dla bota.",
        )
        .await;
    }

    if app.shadowban.registry().set_mode(uid.get(), mode) {
        respond_text(
            ctx,
            cmd,
            &format!("✅ Tryb shadowbana <@{}>: {}", uid.get(), mode_label(mode)),
        )
        .await
    } else {
        respond_text(ctx, cmd, &format!("ℹ️ <@{}> nie ma shadowbana.", uid.get())).await
    }
}

async fn handle_clean(ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let Some(gid) = cmd.guild_id else {
        return respond_text(ctx, cmd, "Użyj na serwerze.").await;
    };
    let names = [super::WEBHOOK_NAME, crate::antiscam::WEBHOOK_NAME];
    let removed = clean_webhooks(&ctx.http, gid, &names).await?;
    respond_text(ctx, cmd, &format!("🧹 Usunięto webhooków: {removed}.")).await
}

fn help_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("🥷 System ShadowBan")
        .description("Użytkownik z shadowbanem pisze dalej, ale nikt tego nie widzi.")
        .colour(Colour::new(0x607D8B))
        .field(
            "Tryby",
            format!(
                "• {}\n• {}\n• {}",
                mode_label(ShadowMode::Delete),
                mode_label(ShadowMode::Modify),
                mode_label(ShadowMode::Invisible)
            ),
            false,
        )
        .field(
            "Komendy (administracja)",
            "• `/shadowban user [mode]`\n\
             • `/unshadowban user`\n\
             • `/shadowbanned`\n\
             • `/shadowban-mode user mode`\n\
             • `/clean-webhooks`",
            false,
        )
        .footer(CreateEmbedFooter::new(SYSTEM_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_is_admin_only() {
        let defs = ShadowBanCommands::command_definitions();
        assert_eq!(defs.len(), 6);
        for def in defs {
            let v = serde_json::to_value(&def).unwrap();
            let admin = Permissions::ADMINISTRATOR.bits().to_string();
            assert_eq!(v["default_member_permissions"], admin.as_str(), "{}", v["name"]);
        }
    }
}
