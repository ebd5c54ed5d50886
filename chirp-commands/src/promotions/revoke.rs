use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use chirp_core::{Context, Error};
use chirp_database::ids::normalize_record_id;
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::promotions::{delete_promotion, get_promotion};
use chirp_database::model::guild_config::ConfigKey;

use super::NOT_FOUND;
use super::embeds::{PromotionSummary, removal_audit_reason, revoked_embed};
use crate::access::ensure_issuer;
use crate::embeds::{
    fetch_user_profile, guild_only_message, profile_from_user, resolve_role_name, send_success,
    send_warning,
};
use crate::logging::edit_log_message;

/// Revoke a promotion
#[poise::command(slash_command)]
pub async fn revoke(
    ctx: Context<'_>,
    #[description = "The Promotion ID to revoke"] promotion_id: String,
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
        "revoke promotions",
    )
    .await?
    {
        return Ok(());
    }

    let Some(promotion_id) = normalize_record_id(&promotion_id) else {
        return send_warning(ctx, NOT_FOUND).await;
    };
    let Some(promotion) = get_promotion(db, guild_id.get(), &promotion_id).await? else {
        return send_warning(ctx, NOT_FOUND).await;
    };

    if promotion.member_id == ctx.author().id.get() {
        return send_warning(ctx, "You cannot revoke your own promotion.").await;
    }

    let member = fetch_user_profile(ctx.http(), promotion.member_id).await;
    let revoker = profile_from_user(ctx.author());
    let role_name = resolve_role_name(ctx, guild_id, promotion.new_role_id).await;
    let summary = PromotionSummary::new(&promotion, role_name.as_deref());

    edit_log_message(
        ctx.http(),
        config.channel(ConfigKey::PromotionLog),
        promotion.log_message_id,
        revoked_embed(&member, &revoker, summary),
    )
    .await;
    edit_log_message(
        ctx.http(),
        config.channel(ConfigKey::PromotionAuditLog),
        promotion.audit_message_id,
        revoked_embed(&member, &revoker, summary),
    )
    .await;

    if role_name.is_some() {
        let audit_reason = removal_audit_reason(&revoker, &promotion.promotion_id);
        if let Err(source) = ctx
            .http()
            .remove_member_role(
                guild_id,
                serenity::UserId::new(promotion.member_id),
                serenity::RoleId::new(promotion.new_role_id),
                Some(&audit_reason),
            )
            .await
        {
            warn!(
                ?source,
                guild_id = guild_id.get(),
                member_id = promotion.member_id,
                role_id = promotion.new_role_id,
                "failed to remove promotion role"
            );
        }
    }

    delete_promotion(db, guild_id.get(), &promotion.promotion_id).await?;

    info!(
        guild_id = guild_id.get(),
        promotion_id = %promotion.promotion_id,
        revoked_by = ctx.author().id.get(),
        "promotion revoked"
    );

    send_success(
        ctx,
        format!(
            "Successfully revoked promotion of **{member}** from **@{}**.",
            summary.role_name
        ),
    )
    .await
}
