use tracing::info;

use chirp_core::{Context, Error};
use chirp_database::ids::normalize_record_id;
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::infractions::{delete_infraction, get_infraction};
use chirp_database::model::guild_config::ConfigKey;

use super::embeds::{InfractionSummary, revoked_embed};
use super::view::NOT_FOUND;
use crate::access::ensure_issuer;
use crate::embeds::{
    fetch_user_profile, guild_only_message, profile_from_user, send_success, send_warning,
};
use crate::logging::edit_log_message;

/// Revoke an infraction
#[poise::command(slash_command)]
pub async fn revoke(
    ctx: Context<'_>,
    #[description = "The Infraction ID to revoke"] infraction_id: String,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    ctx.defer_ephemeral().await?;

    let db = &ctx.data().db;
    let config = get_guild_config(db, guild_id.get()).await?;
    if !ensure_issuer(
        ctx,
        guild_id,
        &config,
        ConfigKey::InfractionIssuerRole,
        "revoke infractions",
    )
    .await?
    {
        return Ok(());
    }

    let Some(infraction_id) = normalize_record_id(&infraction_id) else {
        return send_warning(ctx, NOT_FOUND).await;
    };
    let Some(infraction) = get_infraction(db, guild_id.get(), &infraction_id).await? else {
        return send_warning(ctx, NOT_FOUND).await;
    };

    if infraction.member_id == ctx.author().id.get() {
        return send_warning(ctx, "You cannot revoke your own infraction.").await;
    }

    let member = fetch_user_profile(ctx.http(), infraction.member_id).await;
    let revoker = profile_from_user(ctx.author());
    let summary = InfractionSummary::from(&infraction);

    edit_log_message(
        ctx.http(),
        config.channel(ConfigKey::InfractionLog),
        infraction.log_message_id,
        revoked_embed(&member, &revoker, summary),
    )
    .await;
    edit_log_message(
        ctx.http(),
        config.channel(ConfigKey::InfractionAuditLog),
        infraction.audit_message_id,
        revoked_embed(&member, &revoker, summary),
    )
    .await;

    delete_infraction(db, guild_id.get(), &infraction.infraction_id).await?;
    ctx.data().expiries.cancel(&infraction.infraction_id);

    info!(
        guild_id = guild_id.get(),
        infraction_id = %infraction.infraction_id,
        revoked_by = ctx.author().id.get(),
        "infraction revoked"
    );

    send_success(ctx, format!("Successfully revoked infraction of **{member}**.")).await
}
