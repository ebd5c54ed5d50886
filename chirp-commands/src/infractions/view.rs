use chirp_core::{Context, Error};
use chirp_database::ids::normalize_record_id;
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::infractions::get_infraction;
use chirp_database::model::guild_config::ConfigKey;

use super::embeds::details_embed;
use crate::access::ensure_issuer;
use crate::embeds::{cached_guild_icon, fetch_user_profile, guild_only_message, send_warning};

pub(super) const NOT_FOUND: &str = "No infraction found with the given Infraction ID.";

/// View infraction details by Infraction ID
#[poise::command(slash_command)]
pub async fn view(
    ctx: Context<'_>,
    #[description = "The Infraction ID to view"] infraction_id: String,
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
        "view infractions",
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

    let member = fetch_user_profile(ctx.http(), infraction.member_id).await;
    let issuer = fetch_user_profile(ctx.http(), infraction.issued_by_id).await;
    let icon = cached_guild_icon(ctx);

    ctx.send(
        poise::CreateReply::default()
            .embed(details_embed(&infraction, &member, &issuer, icon.as_deref()))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
