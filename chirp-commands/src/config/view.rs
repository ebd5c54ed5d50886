use chirp_core::{Context, Error};
use chirp_database::impls::guild_config::{get_guild_config, guild_config_exists};
use chirp_utils::embed::titled_embed;

use super::embeds::{ConfigView, render_config_lines};
use crate::access::ensure_manage_guild;
use crate::embeds::{cached_guild_icon, guild_only_message};

/// View current configuration settings.
#[poise::command(slash_command, default_member_permissions = "MANAGE_GUILD")]
pub async fn view(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    ctx.defer_ephemeral().await?;

    if !ensure_manage_guild(ctx, guild_id).await? {
        return Ok(());
    }

    let thumbnail = cached_guild_icon(ctx);
    let config = get_guild_config(&ctx.data().db, guild_id.get()).await?;

    // The cache cannot tell a missing row from a stored `{}`.
    let exists = !config.is_empty() || guild_config_exists(&ctx.data().db, guild_id.get()).await?;

    let embed = match ConfigView::new(exists, &config) {
        ConfigView::Missing => titled_embed(
            "No Configuration Found",
            "No configuration settings have been set for this guild.",
            thumbnail.as_deref(),
        ),
        ConfigView::Empty => titled_embed(
            "Configuration Empty",
            "Configuration document exists but no specific settings are set.",
            thumbnail.as_deref(),
        ),
        ConfigView::Entries(entries) => titled_embed(
            "Current Configuration",
            render_config_lines(&entries),
            thumbnail.as_deref(),
        ),
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
