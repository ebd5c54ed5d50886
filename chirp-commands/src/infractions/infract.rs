use poise::serenity_prelude as serenity;
use tracing::info;

use chirp_core::{Context, Error};
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::infractions::{NewInfraction, create_infraction, next_infraction_id};
use chirp_database::model::guild_config::ConfigKey;
use chirp_utils::formatting::normalize_reason;
use chirp_utils::parse::parse_duration_seconds;
use chirp_utils::time::{expiry_after, now_unix_secs};

use super::autocomplete_infraction_type;
use super::embeds::{InfractionSummary, audit_embed, dm_embed, log_embed};
use super::expiry::schedule_expiry;
use crate::access::ensure_issuer;
use crate::embeds::{
    bot_profile, fetch_guild_profile, guild_only_message, profile_from_user, send_success,
    send_warning,
};
use crate::logging::{post_log_message, send_member_dm};

/// Infract a member
#[poise::command(slash_command)]
pub async fn infract(
    ctx: Context<'_>,
    #[description = "The member to infract"] member: serenity::User,
    #[description = "The type of infraction"]
    #[rename = "type"]
    #[autocomplete = "autocomplete_infraction_type"]
    infraction_type: String,
    #[description = "Reason for the infraction"] reason: Option<String>,
    #[description = "How long the infraction stays active, e.g. 30m, 7d, 1d12h"]
    duration: Option<String>,
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
        "infract others",
    )
    .await?
    {
        return Ok(());
    }

    if member.id == ctx.author().id {
        return send_warning(ctx, "You cannot infract yourself.").await;
    }

    if !config.has_infraction_type(&infraction_type) {
        return send_warning(ctx, "The specified infraction type is not valid.").await;
    }

    let now = now_unix_secs();
    let expires_at = match duration.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            match parse_duration_seconds(raw).and_then(|seconds| expiry_after(now, seconds)) {
                Some(at) => Some(at),
                None => {
                    return send_warning(
                        ctx,
                        "Invalid duration. Use a format like `30m`, `7d` or `1d12h`.",
                    )
                    .await;
                }
            }
        }
        None => None,
    };

    let reason = normalize_reason(reason.as_deref());
    let infraction_id = next_infraction_id(db).await?;

    let member_profile = profile_from_user(&member);
    let issuer_profile = profile_from_user(ctx.author());
    let summary = InfractionSummary {
        infraction_id: &infraction_id,
        infraction_type: &infraction_type,
        reason: reason.as_deref(),
        created_at: now,
        expires_at,
    };

    let log_message_id = post_log_message(
        ctx.http(),
        config.channel(ConfigKey::InfractionLog),
        Some(member_profile.mention()),
        log_embed(&member_profile, &issuer_profile, summary),
    )
    .await;
    let audit_message_id = post_log_message(
        ctx.http(),
        config.channel(ConfigKey::InfractionAuditLog),
        None,
        audit_embed(&member_profile, &issuer_profile, summary),
    )
    .await;

    let guild = fetch_guild_profile(ctx.http(), guild_id).await;
    let bot_profile = bot_profile(ctx.cache());
    send_member_dm(
        ctx.http(),
        &member,
        dm_embed(&guild, &member_profile, &issuer_profile, &bot_profile, summary),
    )
    .await;

    let infraction = create_infraction(
        db,
        &infraction_id,
        NewInfraction {
            guild_id: guild_id.get(),
            member_id: member.id.get(),
            infraction_type: &infraction_type,
            issued_by_id: ctx.author().id.get(),
            log_message_id,
            audit_message_id,
            reason: reason.as_deref(),
            expires_at,
        },
    )
    .await?;

    info!(
        guild_id = guild_id.get(),
        infraction_id = %infraction.infraction_id,
        member_id = infraction.member_id,
        issued_by_id = infraction.issued_by_id,
        expires_at = ?infraction.expires_at,
        "infraction issued"
    );

    if let Some(expires_at) = infraction.expires_at {
        schedule_expiry(
            ctx.serenity_context().http.clone(),
            db.clone(),
            &ctx.data().expiries,
            guild_id.get(),
            infraction.infraction_id.clone(),
            expires_at,
        );
    }

    send_success(ctx, format!("Successfully infracted **{}**.", member.tag())).await
}
