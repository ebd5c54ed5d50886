use poise::serenity_prelude as serenity;

use chirp_database::model::promotion::Promotion;
use chirp_utils::embed::DEFAULT_EMBED_COLOR;
use chirp_utils::formatting::{discord_timestamp, reason_or_default, role_mention};

use crate::embeds::{GuildProfile, UserProfile, sanitize_mentions};

/// Shown where a promotion's role has since been deleted.
pub const ROLE_NOT_FOUND: &str = "Role not found";

#[derive(Clone, Copy, Debug)]
pub struct PromotionSummary<'a> {
    pub promotion_id: &'a str,
    pub role_name: &'a str,
    pub reason: Option<&'a str>,
    pub created_at: u64,
}

impl<'a> PromotionSummary<'a> {
    pub fn new(promotion: &'a Promotion, role_name: Option<&'a str>) -> Self {
        Self {
            promotion_id: &promotion.promotion_id,
            role_name: role_name.unwrap_or(ROLE_NOT_FOUND),
            reason: promotion.reason.as_deref(),
            created_at: promotion.created_at,
        }
    }
}

fn reason_text(reason: Option<&str>) -> String {
    sanitize_mentions(reason_or_default(reason))
}

fn signed(embed: serenity::CreateEmbed, signer: &UserProfile) -> serenity::CreateEmbed {
    let mut author = serenity::CreateEmbedAuthor::new(format!("Signed, {signer}"));
    if let Some(url) = signer.avatar_url.as_deref() {
        author = author.icon_url(url);
    }
    embed.author(author)
}

fn with_thumbnail(embed: serenity::CreateEmbed, url: Option<&str>) -> serenity::CreateEmbed {
    match url {
        Some(url) => embed.thumbnail(url),
        None => embed,
    }
}

/// Audit-log reason attached to the role grant.
pub fn grant_audit_reason(issuer: &UserProfile, summary: PromotionSummary<'_>) -> String {
    format!(
        "Promoted by {issuer} | Reason: {} | Promotion ID: {}",
        reason_or_default(summary.reason),
        summary.promotion_id
    )
}

pub fn removal_audit_reason(revoker: &UserProfile, promotion_id: &str) -> String {
    format!("Promotion revoked by {revoker} | Promotion ID: {promotion_id}")
}

pub fn log_description(member: &UserProfile, summary: PromotionSummary<'_>) -> String {
    format!(
        "**{member}**, you have been promoted.\n\n\
         > **New Role:** @{}\n\
         > **Reason:** {}\n\
         > **Promotion ID:** {}",
        summary.role_name,
        reason_text(summary.reason),
        summary.promotion_id,
    )
}

pub fn audit_description(
    member: &UserProfile,
    issuer: &UserProfile,
    summary: PromotionSummary<'_>,
) -> String {
    format!(
        "> **Member Promoted:** {}\n\
         > **New Role:** @{}\n\
         > **Promoted By:** {}\n\
         > **Reason:** {}\n\
         > **Promotion ID:** {}",
        member.mention(),
        summary.role_name,
        issuer.mention(),
        reason_text(summary.reason),
        summary.promotion_id,
    )
}

pub fn revoked_description(
    member: &UserProfile,
    revoker: &UserProfile,
    summary: PromotionSummary<'_>,
) -> String {
    format!(
        "***Promotion ID {} has been revoked by {revoker}***\n\n\
         > **Member:** {member}\n\
         > **Role Revoked:** @{}\n\
         > **Original Reason:** {}\n\
         > **Issued At:** {}",
        summary.promotion_id,
        summary.role_name,
        reason_text(summary.reason),
        discord_timestamp(summary.created_at, 'f'),
    )
}

pub fn log_embed(
    member: &UserProfile,
    issuer: &UserProfile,
    summary: PromotionSummary<'_>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(log_description(member, summary));
    with_thumbnail(signed(embed, issuer), member.avatar_url.as_deref())
}

pub fn audit_embed(
    member: &UserProfile,
    issuer: &UserProfile,
    summary: PromotionSummary<'_>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title("Promotion Audit Log")
        .description(audit_description(member, issuer, summary));
    with_thumbnail(signed(embed, issuer), member.avatar_url.as_deref())
}

pub fn dm_embed(
    guild: &GuildProfile,
    member: &UserProfile,
    issuer: &UserProfile,
    bot: &UserProfile,
    summary: PromotionSummary<'_>,
) -> serenity::CreateEmbed {
    let description = format!(
        "You have been promoted in **{}**!\n\n\
         > **New Role:** @{}\n\
         > **Reason:** {}\n\
         > **Promotion ID:** {}\n\n\
         Congratulations!",
        guild.name,
        summary.role_name,
        reason_text(summary.reason),
        summary.promotion_id,
    );

    let mut footer = serenity::CreateEmbedFooter::new(bot.tag.clone());
    if let Some(url) = bot.avatar_url.as_deref() {
        footer = footer.icon_url(url);
    }

    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
        .footer(footer);
    let thumbnail = guild
        .icon_url
        .as_deref()
        .or(member.avatar_url.as_deref());
    with_thumbnail(signed(embed, issuer), thumbnail)
}

pub fn revoked_embed(
    member: &UserProfile,
    revoker: &UserProfile,
    summary: PromotionSummary<'_>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(revoked_description(member, revoker, summary));
    with_thumbnail(signed(embed, revoker), member.avatar_url.as_deref())
}

pub fn details_embed(
    promotion: &Promotion,
    member: &UserProfile,
    issuer: &UserProfile,
    role_exists: bool,
) -> serenity::CreateEmbed {
    let role = if role_exists {
        format!("{} ({})", role_mention(promotion.new_role_id), promotion.new_role_id)
    } else {
        format!("{ROLE_NOT_FOUND} ({})", promotion.new_role_id)
    };

    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!("Promotion Details: {}", promotion.promotion_id))
        .field("Member", format!("{member} ({})", member.id), true)
        .field("New Role", role, true)
        .field("Issued By", format!("{issuer} ({})", issuer.id), true)
        .field("Reason", reason_text(promotion.reason.as_deref()), false)
        .field(
            "Timestamp",
            discord_timestamp(promotion.created_at, 'f'),
            false,
        );
    with_thumbnail(embed, member.avatar_url.as_deref())
}

/// One entry of a member's promotion history.
pub fn list_entry(promotion: &Promotion) -> String {
    format!(
        "**ID:** `{}` - {}\n**Role:** {} - **Reason:** *{}*",
        promotion.promotion_id,
        discord_timestamp(promotion.created_at, 'f'),
        role_mention(promotion.new_role_id),
        reason_text(promotion.reason.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: u64, tag: &str) -> UserProfile {
        UserProfile {
            id,
            tag: tag.to_owned(),
            avatar_url: None,
        }
    }

    fn promotion(reason: Option<&str>) -> Promotion {
        Promotion {
            promotion_id: "ZX81QW20".to_owned(),
            guild_id: 1,
            member_id: 2,
            new_role_id: 77,
            issued_by_id: 3,
            log_message_id: None,
            audit_message_id: None,
            reason: reason.map(str::to_owned),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn log_description_names_role_and_id() {
        let record = promotion(Some("great work"));
        let text = log_description(
            &profile(2, "member"),
            PromotionSummary::new(&record, Some("Senior Staff")),
        );

        assert_eq!(
            text,
            "**member**, you have been promoted.\n\n\
             > **New Role:** @Senior Staff\n\
             > **Reason:** great work\n\
             > **Promotion ID:** ZX81QW20"
        );
    }

    #[test]
    fn missing_role_is_labelled() {
        let record = promotion(None);
        let text = revoked_description(
            &profile(2, "member"),
            &profile(9, "lead"),
            PromotionSummary::new(&record, None),
        );

        assert!(text.starts_with("***Promotion ID ZX81QW20 has been revoked by lead***"));
        assert!(text.contains("> **Role Revoked:** @Role not found"));
        assert!(text.contains("> **Original Reason:** No reason provided"));
    }

    #[test]
    fn audit_reasons_carry_the_id() {
        let record = promotion(None);
        let issuer = profile(3, "staff");

        assert_eq!(
            grant_audit_reason(&issuer, PromotionSummary::new(&record, Some("Mod"))),
            "Promoted by staff | Reason: No reason provided | Promotion ID: ZX81QW20"
        );
        assert_eq!(
            removal_audit_reason(&issuer, "ZX81QW20"),
            "Promotion revoked by staff | Promotion ID: ZX81QW20"
        );
    }

    #[test]
    fn list_entry_uses_role_mention() {
        assert_eq!(
            list_entry(&promotion(Some("ok"))),
            "**ID:** `ZX81QW20` - <t:1700000000:f>\n**Role:** <@&77> - **Reason:** *ok*"
        );
    }
}
