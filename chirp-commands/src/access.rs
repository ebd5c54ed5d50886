use poise::serenity_prelude as serenity;

use crate::embeds::send_warning;
use chirp_core::{Context, Error};
use chirp_database::model::guild_config::{ConfigKey, GuildConfig};
use chirp_utils::permissions::{RoleCheck, check_issuer_role, has_user_permission};

/// Gate a staff command on its configured issuer role.
///
/// Sends the refusal itself and returns `false` when the invoker may not
/// continue. `action` completes "You don't have permission to ...".
pub async fn ensure_issuer(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    config: &GuildConfig,
    key: ConfigKey,
    action: &str,
) -> Result<bool, Error> {
    let check = check_issuer_role(ctx.http(), guild_id, ctx.author().id, config.role(key)).await?;

    match check {
        RoleCheck::Allowed => Ok(true),
        RoleCheck::RoleMissing => {
            send_warning(ctx, format!("{} not found in the guild.", issuer_role_name(key))).await?;
            Ok(false)
        }
        RoleCheck::NotHolder => {
            send_warning(ctx, format!("You don't have permission to {action}.")).await?;
            Ok(false)
        }
    }
}

fn issuer_role_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::PromotionIssuerRole => "Promotion issuer role",
        _ => "Infraction issuer role",
    }
}

/// Run-time MANAGE_GUILD check backing the commands' default permissions.
pub async fn ensure_manage_guild(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
) -> Result<bool, Error> {
    if has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(true);
    }

    send_warning(ctx, "You need the Manage Server permission to do that.").await?;
    Ok(false)
}
