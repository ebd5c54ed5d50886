use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use chirp_core::{Context, Error};
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::promotions::{NewPromotion, create_promotion, next_promotion_id};
use chirp_database::model::guild_config::ConfigKey;
use chirp_utils::formatting::normalize_reason;
use chirp_utils::time::now_unix_secs;

use super::embeds::{
    PromotionSummary, audit_embed, dm_embed, grant_audit_reason, log_embed,
};
use crate::access::ensure_issuer;
use crate::embeds::{
    bot_profile, fetch_guild_profile, guild_only_message, profile_from_user, send_success,
    send_warning,
};
use crate::logging::{post_log_message, send_member_dm};

/// Promote a member
#[poise::command(slash_command)]
pub async fn promote(
    ctx: Context<'_>,
    #[description = "The member to promote"] member: serenity::User,
    #[description = "The new role to assign to the member"] new_role: serenity::Role,
    #[description = "Reason for the promotion"] reason: Option<String>,
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
        "promote others",
    )
    .await?
    {
        return Ok(());
    }

    if member.id == ctx.author().id {
        return send_warning(ctx, "You cannot promote yourself.").await;
    }

    let reason = normalize_reason(reason.as_deref());
    let promotion_id = next_promotion_id(db).await?;

    let member_profile = profile_from_user(&member);
    let issuer_profile = profile_from_user(ctx.author());
    let summary = PromotionSummary {
        promotion_id: &promotion_id,
        role_name: &new_role.name,
        reason: reason.as_deref(),
        created_at: now_unix_secs(),
    };

    let log_message_id = post_log_message(
        ctx.http(),
        config.channel(ConfigKey::PromotionLog),
        Some(member_profile.mention()),
        log_embed(&member_profile, &issuer_profile, summary),
    )
    .await;
    let audit_message_id = post_log_message(
        ctx.http(),
        config.channel(ConfigKey::PromotionAuditLog),
        None,
        audit_embed(&member_profile, &issuer_profile, summary),
    )
    .await;

    let audit_reason = grant_audit_reason(&issuer_profile, summary);
    if let Err(source) = ctx
        .http()
        .add_member_role(guild_id, member.id, new_role.id, Some(&audit_reason))
        .await
    {
        warn!(
            ?source,
            guild_id = guild_id.get(),
            member_id = member.id.get(),
            role_id = new_role.id.get(),
            "failed to grant promotion role"
        );
    }

    let guild = fetch_guild_profile(ctx.http(), guild_id).await;
    let bot_profile = bot_profile(ctx.cache());
    send_member_dm(
        ctx.http(),
        &member,
        dm_embed(&guild, &member_profile, &issuer_profile, &bot_profile, summary),
    )
    .await;

    let promotion = create_promotion(
        db,
        &promotion_id,
        NewPromotion {
            guild_id: guild_id.get(),
            member_id: member.id.get(),
            new_role_id: new_role.id.get(),
            issued_by_id: ctx.author().id.get(),
            log_message_id,
            audit_message_id,
            reason: reason.as_deref(),
        },
    )
    .await?;

    info!(
        guild_id = guild_id.get(),
        promotion_id = %promotion.promotion_id,
        member_id = promotion.member_id,
        role_id = promotion.new_role_id,
        "promotion issued"
    );

    send_success(
        ctx,
        format!(
            "Successfully promoted **{}** to **@{}**.",
            member.tag(),
            new_role.name
        ),
    )
    .await
}
