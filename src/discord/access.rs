//! Uprawnienia liczone z cache gildii + drobne helpery do interakcji.

use anyhow::Result;
use serenity::all::{
    Cache, CommandDataOptionValue, CommandInteraction, Context, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, GuildId, Permissions, RoleId,
    UserId,
};

/// Suma uprawnień z ról (łącznie z @everyone). Właściciel = wszystko.
/// `roles = None` → bierzemy role członka z cache.
pub fn cached_permissions(
    cache: &Cache,
    guild_id: GuildId,
    user_id: UserId,
    roles: Option<&[RoleId]>,
) -> Option<Permissions> {
    let guild = cache.guild(guild_id)?;
    if guild.owner_id == user_id {
        return Some(Permissions::all());
    }
    let member_roles: Vec<RoleId> = match roles {
        Some(r) => r.to_vec(),
        None => guild.members.get(&user_id)?.roles.clone(),
    };
    let everyone = RoleId::new(guild_id.get());
    let perms = std::iter::once(&everyone)
        .chain(member_roles.iter())
        .filter_map(|rid| guild.roles.get(rid))
        .fold(Permissions::empty(), |acc, r| acc | r.permissions);
    Some(perms)
}

pub fn is_admin(cache: &Cache, guild_id: GuildId, user_id: UserId, roles: Option<&[RoleId]>) -> bool {
    cached_permissions(cache, guild_id, user_id, roles)
        .map(|p| p.administrator())
        .unwrap_or(false)
}

/// Członek spoza cache → dociągamy przez HTTP i liczymy na rolach.
pub async fn is_admin_member(ctx: &Context, guild_id: GuildId, user_id: UserId) -> bool {
    if is_admin(&ctx.cache, guild_id, user_id, None) {
        return true;
    }
    match guild_id.member(ctx, user_id).await {
        Ok(m) => is_admin(&ctx.cache, guild_id, user_id, Some(m.roles.as_slice())),
        Err(_) => false,
    }
}

pub fn bot_can_manage_webhooks(ctx: &Context, guild_id: GuildId) -> bool {
    let me = ctx.cache.current_user().id;
    cached_permissions(&ctx.cache, guild_id, me, None)
        .map(|p| p.administrator() || p.manage_webhooks())
        .unwrap_or(false)
}

/// Uprawnienia wywołującego – Discord podaje je w samej interakcji.
pub fn invoker_is_admin(cmd: &CommandInteraction) -> bool {
    cmd.member
        .as_ref()
        .and_then(|m| m.permissions)
        .map(|p| p.administrator())
        .unwrap_or(false)
}

pub fn opt_user(cmd: &CommandInteraction, name: &str) -> Option<UserId> {
    cmd.data.options.iter().find_map(|o| match (&o.name[..], &o.value) {
        (n, CommandDataOptionValue::User(u)) if n == name => Some(*u),
        _ => None,
    })
}

pub fn opt_role(cmd: &CommandInteraction, name: &str) -> Option<RoleId> {
    cmd.data.options.iter().find_map(|o| match (&o.name[..], &o.value) {
        (n, CommandDataOptionValue::Role(r)) if n == name => Some(*r),
        _ => None,
    })
}

pub fn opt_str(cmd: &CommandInteraction, name: &str) -> Option<String> {
    cmd.data.options.iter().find_map(|o| match (&o.name[..], &o.value) {
        (n, CommandDataOptionValue::String(s)) if n == name => Some(s.clone()),
        _ => None,
    })
}

pub async fn respond_text(ctx: &Context, cmd: &CommandInteraction, msg: &str) -> Result<()> {
    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(msg)
                .ephemeral(true),
        ),
    )
    .await?;
    Ok(())
}

pub async fn respond_embed(ctx: &Context, cmd: &CommandInteraction, embed: CreateEmbed) -> Result<()> {
    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .embed(embed)
                .ephemeral(true),
        ),
    )
    .await?;
    Ok(())
}
