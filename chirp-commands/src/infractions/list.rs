use poise::serenity_prelude as serenity;

use chirp_core::{Context, Error};
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::infractions::list_member_infractions;
use chirp_database::model::guild_config::ConfigKey;
use chirp_utils::pagination::{chunk_pages, paginate_embed_pages};

use super::embeds::list_entry;
use crate::access::ensure_issuer;
use crate::embeds::{guild_only_message, send_warning};

/// Most infractions pulled for one listing.
const LIST_LIMIT: i64 = 100;
const ENTRIES_PER_PAGE: usize = 5;

/// List a member's infractions, newest first
#[poise::command(slash_command)]
pub async fn list(
    ctx: Context<'_>,
    #[description = "The member whose infractions to list"] member: serenity::User,
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

    let infractions =
        list_member_infractions(db, guild_id.get(), member.id.get(), LIST_LIMIT).await?;
    if infractions.is_empty() {
        return send_warning(ctx, format!("No infractions found for **{}**.", member.tag())).await;
    }

    let entries: Vec<String> = infractions.iter().map(list_entry).collect();
    let pages = chunk_pages(&entries, ENTRIES_PER_PAGE);
    let footer = format!("Found {} infraction(s).", infractions.len());
    let title = format!("Infractions for {}", member.display_name());

    paginate_embed_pages(ctx, &title, &pages, Some(&footer)).await?;
    Ok(())
}
