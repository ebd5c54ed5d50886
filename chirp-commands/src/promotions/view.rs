use poise::serenity_prelude as serenity;

use chirp_core::{Context, Error};
use chirp_database::ids::normalize_record_id;
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::promotions::{get_promotion, list_member_promotions};
use chirp_database::model::guild_config::ConfigKey;
use chirp_utils::embed::DEFAULT_EMBED_COLOR;
use chirp_utils::pagination::{chunk_pages, paginate_embed_pages};

use super::NOT_FOUND;
use super::embeds::{details_embed, list_entry};
use crate::access::ensure_issuer;
use crate::embeds::{
    fetch_user_profile, guild_only_message, resolve_role_name, send_warning,
};

const ENTRIES_PER_PAGE: usize = 5;

/// Which records a `view` call asks for.
#[derive(Debug, PartialEq, Eq)]
enum Lookup<'a, T> {
    ById(&'a str),
    ByMember(&'a T),
}

fn pick_lookup<'a, T>(
    promotion_id: Option<&'a str>,
    member: Option<&'a T>,
) -> Result<Lookup<'a, T>, &'static str> {
    match (promotion_id, member) {
        (Some(id), None) => Ok(Lookup::ById(id)),
        (None, Some(member)) => Ok(Lookup::ByMember(member)),
        (None, None) => Err("You must provide either a Promotion ID or a member to view."),
        (Some(_), Some(_)) => Err("You can only provide a Promotion ID or a member, not both."),
    }
}

/// View promotion details by ID or for a member
#[poise::command(slash_command)]
pub async fn view(
    ctx: Context<'_>,
    #[description = "The Promotion ID to view"] promotion_id: Option<String>,
    #[description = "The member to view promotions for"] member: Option<serenity::User>,
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
        ConfigKey::PromotionIssuerRole,
        "view promotions",
    )
    .await?
    {
        return Ok(());
    }

    let promotion_id = promotion_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());

    match pick_lookup(promotion_id, member.as_ref()) {
        Err(message) => send_warning(ctx, message).await,
        Ok(Lookup::ById(raw_id)) => {
            let Some(promotion_id) = normalize_record_id(raw_id) else {
                return send_warning(ctx, NOT_FOUND).await;
            };
            let Some(promotion) = get_promotion(db, guild_id.get(), &promotion_id).await? else {
                return send_warning(ctx, NOT_FOUND).await;
            };

            let member = fetch_user_profile(ctx.http(), promotion.member_id).await;
            let issuer = fetch_user_profile(ctx.http(), promotion.issued_by_id).await;
            let role_exists = resolve_role_name(ctx, guild_id, promotion.new_role_id)
                .await
                .is_some();

            ctx.send(
                poise::CreateReply::default()
                    .embed(details_embed(&promotion, &member, &issuer, role_exists))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Ok(Lookup::ByMember(member)) => {
            let promotions = list_member_promotions(db, guild_id.get(), member.id.get()).await?;
            if promotions.is_empty() {
                let embed = serenity::CreateEmbed::new()
                    .color(DEFAULT_EMBED_COLOR)
                    .description(format!("No promotions found for **{}**.", member.tag()));
                ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                    .await?;
                return Ok(());
            }

            let entries: Vec<String> = promotions.iter().map(list_entry).collect();
            let pages = chunk_pages(&entries, ENTRIES_PER_PAGE);
            let footer = format!("Found {} promotion(s).", promotions.len());
            let title = format!("Promotions for {}", member.display_name());

            paginate_embed_pages(ctx, &title, &pages, Some(&footer)).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lookup, pick_lookup};

    #[test]
    fn exactly_one_lookup_is_accepted() {
        let member = 5_u64;

        assert_eq!(pick_lookup::<u64>(Some("AB12CD34"), None), Ok(Lookup::ById("AB12CD34")));
        assert_eq!(pick_lookup(None, Some(&member)), Ok(Lookup::ByMember(&member)));
        assert_eq!(
            pick_lookup::<u64>(None, None),
            Err("You must provide either a Promotion ID or a member to view.")
        );
        assert_eq!(
            pick_lookup(Some("AB12CD34"), Some(&member)),
            Err("You can only provide a Promotion ID or a member, not both.")
        );
    }
}
