use anyhow::Result;
use serenity::all::{
    Colour, CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateEmbedFooter, GuildId, Interaction, Permissions, RoleId,
};
use tracing::warn;

use super::classifier::Inspection;
use super::ledger::OffenderRecord;
use super::sanctions::SanctionTier;
use crate::discord::access::{
    invoker_is_admin, opt_role, opt_str, opt_user, respond_embed, respond_text,
};
use crate::discord::gateway::SerenityGateway;
use crate::transport::Moderation;
use crate::AppContext;

const SYSTEM_NAME: &str = "Tigris ScamGuard • AntiScam";
const TOP_N: usize = 10;
const TEST_LIST_MAX: usize = 15;

pub struct AntiScamCommands;

impl AntiScamCommands {
    /// Definicje wszystkich komend modułu (rejestrowane per gildia).
    pub fn command_definitions() -> Vec<CreateCommand> {
        vec![
            CreateCommand::new("scammer-stats")
                .description("Statystyki scammera albo lista najaktywniejszych")
                .add_option(CreateCommandOption::new(
                    CommandOptionType::User,
                    "user",
                    "Użytkownik (opcjonalnie)",
                ))
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("scammer-reset")
                .description("Wyzeruj rejestr prób oszustwa użytkownika")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::User, "user", "Użytkownik")
                        .required(true),
                )
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("scammer-role")
                .description("Ustaw albo pokaż rolę nadawaną scammerom")
                .add_option(CreateCommandOption::new(
                    CommandOptionType::Role,
                    "role",
                    "Nowa rola (puste = pokaż obecną)",
                ))
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("scam-test")
                .description("Sprawdź, jak detektor oceni podany tekst")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::String, "text", "Tekst do sprawdzenia")
                        .required(true),
                )
                .default_member_permissions(Permissions::ADMINISTRATOR),
            CreateCommand::new("antiscam-help")
                .description("Jak działa system AntiScam")
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
            "scammer-stats" => handle_stats(ctx, app, &cmd).await,
            "scammer-reset" => handle_reset(ctx, app, &cmd).await,
            "scammer-role" => handle_role(ctx, app, &cmd).await,
            "scam-test" => handle_test(ctx, app, &cmd).await,
            "antiscam-help" => respond_embed(ctx, &cmd, help_embed()).await,
            _ => return,
        };
        if let Err(e) = res {
            warn!(error = ?e, command = %cmd.data.name, "antiscam command failed");
        }
    }
}

async fn handle_stats(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let ledger = app.antiscam.ledger();

    if let Some(uid) = opt_user(cmd, "user") {
        let Some(rec) = ledger.record(uid.get()) else {
            return respond_text(
                ctx,
                cmd,
                &format!("✅ <@{}> nie ma zarejestrowanych prób oszustwa.", uid.get()),
            )
            .await;
        };
        return respond_embed(ctx, cmd, record_embed(uid.get(), &rec)).await;
    }

    let total = ledger.len();
    if total == 0 {
        return respond_text(ctx, cmd, "✅ Brak scammerów w rejestrze.").await;
    }
    let top = ledger.top(TOP_N);
    respond_embed(ctx, cmd, top_embed(&top, total)).await
}

async fn handle_reset(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let Some(gid) = cmd.guild_id else {
        return respond_text(ctx, cmd, "Użyj na serwerze.").await;
    };
    let Some(uid) = opt_user(cmd, "user") else {
        return respond_text(ctx, cmd, "Wskaż użytkownika.").await;
    };

    if !app.antiscam.ledger().reset(uid.get()) {
        return respond_text(
            ctx,
            cmd,
            &format!("✅ <@{}> nie ma zarejestrowanych prób oszustwa.", uid.get()),
        )
        .await;
    }

    if let Some(role_id) = app.antiscam.flagged_role(gid.get()) {
        let gw = SerenityGateway::new(ctx, super::WEBHOOK_NAME);
        if let Err(e) = gw
            .revoke_role(gid.get(), uid.get(), role_id, "Reset statusu scammera")
            .await
        {
            warn!(error = ?e, user_id = uid.get(), "scammer role removal failed");
        }
    }

    respond_text(
        ctx,
        cmd,
        &format!("✅ Statystyki scammera dla <@{}> zostały wyzerowane.", uid.get()),
    )
    .await
}

async fn handle_role(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let Some(gid) = cmd.guild_id else {
        return respond_text(ctx, cmd, "Użyj na serwerze.").await;
    };

    if let Some(rid) = opt_role(cmd, "role") {
        app.antiscam.set_flagged_role(gid.get(), rid.get());
        return respond_text(
            ctx,
            cmd,
            &format!("✅ Rola <@&{}> będzie nadawana scammerom.", rid.get()),
        )
        .await;
    }

    match app.antiscam.flagged_role(gid.get()) {
        Some(rid) => {
            let exists = ctx
                .cache
                .guild(gid)
                .map(|g| g.roles.contains_key(&RoleId::new(rid)))
                .unwrap_or(true);
            if exists {
                respond_text(ctx, cmd, &format!("ℹ️ Obecna rola dla scammerów: <@&{rid}>")).await
            } else {
                respond_text(ctx, cmd, "⚠️ Skonfigurowana rola nie istnieje albo jest niedostępna.").await
            }
        }
        None => respond_text(ctx, cmd, "ℹ️ Nie skonfigurowano roli dla scammerów.").await,
    }
}

async fn handle_test(ctx: &Context, app: &AppContext, cmd: &CommandInteraction) -> Result<()> {
    if !invoker_is_admin(cmd) {
        return respond_text(ctx, cmd, "⛔ Brak uprawnień.").await;
    }
    let text = opt_str(cmd, "text").unwrap_or_default();
    let report = app.antiscam.classifier().inspect(&text);
    respond_embed(ctx, cmd, inspection_embed(&text, &report)).await
}

/* =========================================
   Embedy
   ========================================= */

fn record_embed(user_id: u64, rec: &OffenderRecord) -> CreateEmbed {
    CreateEmbed::new()
        .title("📊 Statystyki scammera")
        .description(format!("Użytkownik: <@{user_id}>"))
        .colour(Colour::new(0xE74C3C))
        .field("Próby oszustwa", rec.attempt_count.to_string(), true)
        .field("Poziom ostrzeżenia", rec.warning_level.to_string(), true)
        .field(
            "Następna sankcja",
            SanctionTier::from_level(rec.warning_level + 1).label(),
            true,
        )
        .field(
            "Pierwsza próba",
            format!("<t:{}:R>", rec.first_seen_at.timestamp()),
            false,
        )
        .field(
            "Ostatnia próba",
            format!("<t:{}:R>", rec.last_seen_at.timestamp()),
            false,
        )
        .footer(CreateEmbedFooter::new(SYSTEM_NAME))
}

fn top_embed(top: &[(u64, OffenderRecord)], total: usize) -> CreateEmbed {
    let mut e = CreateEmbed::new()
        .title("📊 Lista scammerów")
        .description("Użytkownicy z zarejestrowanymi próbami oszustwa")
        .colour(Colour::new(0xE74C3C));
    for (uid, rec) in top {
        e = e.field(
            format!("ID {uid}"),
            format!(
                "<@{uid}> • Próby: {} | Ostrzeżenia: {} | Ostatnia: <t:{}:R>",
                rec.attempt_count,
                rec.warning_level,
                rec.last_seen_at.timestamp()
            ),
            false,
        );
    }
    let footer = if total > top.len() {
        format!("Pokazano {} z {} scammerów • {SYSTEM_NAME}", top.len(), total)
    } else {
        SYSTEM_NAME.to_string()
    };
    e.footer(CreateEmbedFooter::new(footer))
}

fn join_limited(items: &[String], max: usize) -> String {
    let mut out = items.iter().take(max).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > max {
        out.push_str(&format!(" i {} innych…", items.len() - max));
    }
    out
}

fn inspection_embed(text: &str, r: &Inspection) -> CreateEmbed {
    let (verdict, colour) = if r.suspicious {
        ("**⚠️ PODEJRZANE**", 0xE74C3C)
    } else {
        ("**✅ CZYSTE**", 0x3498DB)
    };
    let mut e = CreateEmbed::new()
        .title("🔍 Test detekcji oszustw")
        .description(format!("**Tekst:**\n```{}```", crate::transport::clip(text, 1500)))
        .colour(Colour::new(colour))
        .field("Wynik", verdict, false);

    let mut tier1: Vec<String> = Vec::new();
    tier1.extend(r.glyphs.iter().cloned());
    tier1.extend(r.exact_words.iter().map(|w| format!("`{w}` (słowo)")));
    tier1.extend(r.high_risk.iter().cloned());
    if !tier1.is_empty() {
        e = e.field("🚨 Wysokie ryzyko", join_limited(&tier1, TEST_LIST_MAX), false);
    }
    if !r.keywords.is_empty() {
        e = e
            .field("🔍 Słowa podejrzane", join_limited(&r.keywords, TEST_LIST_MAX), false)
            .field(
                "📊 Liczba słów podejrzanych",
                format!("{} (próg: {})", r.keywords.len(), r.keyword_threshold),
                true,
            );
    }
    if !r.patterns.is_empty() {
        e = e.field("📝 Wzorce", format!("{} dopasowań", r.patterns.len()), true);
    }
    e.footer(CreateEmbedFooter::new(SYSTEM_NAME))
}

fn help_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("🛡️ System AntiScam")
        .description("Automatycznie wykrywa i neutralizuje próby oszustwa na czacie.")
        .colour(Colour::new(0x3498DB))
        .field(
            "Działanie",
            "• Wykrywanie podejrzanych wiadomości\n\
             • Podmiana na publiczne \"wyznanie\" autora\n\
             • Stopniowane sankcje dla recydywistów\n\
             • Alerty na kanale logów bezpieczeństwa",
            false,
        )
        .field(
            "Sankcje (co 3 próby)",
            "• Poziom 1: rola scammera\n\
             • Poziom 2: timeout 1h\n\
             • Poziom 3: ban",
            false,
        )
        .field(
            "Komendy (administracja)",
            "• `/scammer-stats [user]`\n\
             • `/scammer-reset user`\n\
             • `/scammer-role [role]`\n\
             • `/scam-test text`",
            false,
        )
        .footer(CreateEmbedFooter::new(SYSTEM_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_is_admin_only() {
        let defs = AntiScamCommands::command_definitions();
        assert_eq!(defs.len(), 5);
        for def in defs {
            let v = serde_json::to_value(&def).unwrap();
            let admin = Permissions::ADMINISTRATOR.bits().to_string();
            assert_eq!(v["default_member_permissions"], admin.as_str(), "{}", v["name"]);
        }
    }
}
