use tracing::info;

use chirp_core::{ApplicationContext, Context, Error};
use chirp_database::ids::normalize_record_id;
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::promotions::{get_promotion, update_promotion_reason};
use chirp_database::model::guild_config::ConfigKey;
use chirp_utils::formatting::normalize_reason;
use poise::Modal;

use super::NOT_FOUND;
use super::embeds::{PromotionSummary, audit_embed, log_embed};
use crate::access::ensure_issuer;
use crate::embeds::{
    fetch_user_profile, guild_only_message, resolve_role_name, send_success, send_warning,
};
use crate::logging::edit_log_message;

#[derive(Debug, Default, Modal)]
#[name = "Edit Promotion"]
struct EditPromotionModal {
    #[name = "Reason"]
    #[placeholder = "Leave empty to clear the reason"]
    #[paragraph]
    #[max_length = 1000]
    reason: Option<String>,
}

/// Edit the reason of a promotion
#[poise::command(slash_command)]
pub async fn edit(
    app_ctx: ApplicationContext<'_>,
    #[description = "The Promotion ID to edit"] promotion_id: String,
) -> Result<(), Error> {
    let ctx: Context<'_> = poise::Context::Application(app_ctx);
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    // A modal has to be the first response, so no defer here.
    let db = &ctx.data().db;
    let config = get_guild_config(db, guild_id.get()).await?;
    if !ensure_issuer(
        ctx,
        guild_id,
        &config,
        ConfigKey::PromotionIssuerRole,
        "edit promotions",
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

    let defaults = EditPromotionModal {
        reason: promotion.reason.clone(),
    };
    let Some(submitted) = EditPromotionModal::execute_with_defaults(app_ctx, defaults).await?
    else {
        return Ok(());
    };

    let reason = normalize_reason(submitted.reason.as_deref());
    let Some(updated) =
        update_promotion_reason(db, guild_id.get(), &promotion.promotion_id, reason.as_deref())
            .await?
    else {
        return send_warning(ctx, NOT_FOUND).await;
    };

    let member = fetch_user_profile(ctx.http(), updated.member_id).await;
    let issuer = fetch_user_profile(ctx.http(), updated.issued_by_id).await;
    let role_name = resolve_role_name(ctx, guild_id, updated.new_role_id).await;
    let summary = PromotionSummary::new(&updated, role_name.as_deref());

    edit_log_message(
        ctx.http(),
        config.channel(ConfigKey::PromotionLog),
        updated.log_message_id,
        log_embed(&member, &issuer, summary),
    )
    .await;
    edit_log_message(
        ctx.http(),
        config.channel(ConfigKey::PromotionAuditLog),
        updated.audit_message_id,
        audit_embed(&member, &issuer, summary),
    )
    .await;

    info!(
        guild_id = guild_id.get(),
        promotion_id = %updated.promotion_id,
        edited_by = ctx.author().id.get(),
        "promotion reason edited"
    );

    send_success(
        ctx,
        format!("Successfully edited promotion **{}**.", updated.promotion_id),
    )
    .await
}
