use poise::serenity_prelude as serenity;

use chirp_database::model::infraction::{Infraction, InfractionStatus};
use chirp_utils::embed::DEFAULT_EMBED_COLOR;
use chirp_utils::formatting::{discord_timestamp, reason_or_default};

use crate::embeds::{GuildProfile, UserProfile, sanitize_mentions};

/// The parts of an infraction shown in embeds, available before the record
/// is stored.
#[derive(Clone, Copy, Debug)]
pub struct InfractionSummary<'a> {
    pub infraction_id: &'a str,
    pub infraction_type: &'a str,
    pub reason: Option<&'a str>,
    pub created_at: u64,
    pub expires_at: Option<u64>,
}

impl<'a> From<&'a Infraction> for InfractionSummary<'a> {
    fn from(infraction: &'a Infraction) -> Self {
        Self {
            infraction_id: &infraction.infraction_id,
            infraction_type: &infraction.infraction_type,
            reason: infraction.reason.as_deref(),
            created_at: infraction.created_at,
            expires_at: infraction.expires_at,
        }
    }
}

fn reason_text(reason: Option<&str>) -> String {
    sanitize_mentions(reason_or_default(reason))
}

fn expiry_line(expires_at: Option<u64>) -> String {
    match expires_at {
        Some(at) => format!(
            "\n> **Expires:** {} ({})",
            discord_timestamp(at, 'f'),
            discord_timestamp(at, 'R')
        ),
        None => String::new(),
    }
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

pub fn log_description(member: &UserProfile, summary: InfractionSummary<'_>) -> String {
    format!(
        "**{member}**, you have been infracted.\n\n\
         > **Infraction Type:** {}\n\
         > **Reason:** {}\n\
         > **Infraction ID:** {}{}",
        summary.infraction_type,
        reason_text(summary.reason),
        summary.infraction_id,
        expiry_line(summary.expires_at),
    )
}

pub fn audit_description(
    member: &UserProfile,
    issuer: &UserProfile,
    summary: InfractionSummary<'_>,
) -> String {
    format!(
        "> **Member Infracted:** {}\n\
         > **Infraction Type:** {}\n\
         > **Infracted By:** {}\n\
         > **Reason:** {}\n\
         > **Infraction ID:** {}{}",
        member.mention(),
        summary.infraction_type,
        issuer.mention(),
        reason_text(summary.reason),
        summary.infraction_id,
        expiry_line(summary.expires_at),
    )
}

pub fn revoked_description(
    member: &UserProfile,
    revoker: &UserProfile,
    summary: InfractionSummary<'_>,
) -> String {
    format!(
        "***Infraction ID {} has been revoked by {revoker} ({})***\n\n\
         > **Member:** {member} `({})`\n\
         > **Infraction Type:** {}\n\
         > **Original Reason:** {}\n\
         > **Issued At:** {}",
        summary.infraction_id,
        revoker.id,
        member.id,
        summary.infraction_type,
        reason_text(summary.reason),
        discord_timestamp(summary.created_at, 'f'),
    )
}

pub fn expired_description(member: &UserProfile, summary: InfractionSummary<'_>) -> String {
    format!(
        "***Infraction ID {} has expired***\n\n\
         > **Member:** {member} `({})`\n\
         > **Infraction Type:** {}\n\
         > **Original Reason:** {}\n\
         > **Issued At:** {}",
        summary.infraction_id,
        member.id,
        summary.infraction_type,
        reason_text(summary.reason),
        discord_timestamp(summary.created_at, 'f'),
    )
}

pub fn log_embed(
    member: &UserProfile,
    issuer: &UserProfile,
    summary: InfractionSummary<'_>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(log_description(member, summary));
    with_thumbnail(signed(embed, issuer), member.avatar_url.as_deref())
}

pub fn audit_embed(
    member: &UserProfile,
    issuer: &UserProfile,
    summary: InfractionSummary<'_>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title("Infraction Audit Log")
        .description(audit_description(member, issuer, summary));
    with_thumbnail(signed(embed, issuer), member.avatar_url.as_deref())
}

pub fn dm_embed(
    guild: &GuildProfile,
    member: &UserProfile,
    issuer: &UserProfile,
    bot: &UserProfile,
    summary: InfractionSummary<'_>,
) -> serenity::CreateEmbed {
    let description = format!(
        "You have been infracted in **{}**!\n\n\
         > **Infraction Type:** {}\n\
         > **Reason:** {}\n\
         > **Infraction ID:** {}{}",
        guild.name,
        summary.infraction_type,
        reason_text(summary.reason),
        summary.infraction_id,
        expiry_line(summary.expires_at),
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
    summary: InfractionSummary<'_>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(revoked_description(member, revoker, summary));
    with_thumbnail(signed(embed, revoker), member.avatar_url.as_deref())
}

pub fn expired_embed(member: &UserProfile, summary: InfractionSummary<'_>) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(expired_description(member, summary));
    with_thumbnail(embed, member.avatar_url.as_deref())
}

pub fn status_text(infraction: &Infraction) -> String {
    match (infraction.status, infraction.expires_at) {
        (InfractionStatus::Expired, _) => "Expired".to_owned(),
        (InfractionStatus::Active, Some(at)) => format!(
            "Active, expires {}",
            discord_timestamp(at, 'R')
        ),
        (InfractionStatus::Active, None) => "Active".to_owned(),
    }
}

pub fn details_embed(
    infraction: &Infraction,
    member: &UserProfile,
    issuer: &UserProfile,
    guild_icon: Option<&str>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!("Infraction Details: {}", infraction.infraction_id))
        .field("Member", format!("{member} ({})", member.id), true)
        .field("Infraction Type", infraction.infraction_type.clone(), true)
        .field("Issued By", format!("{issuer} ({})", issuer.id), true)
        .field("Reason", reason_text(infraction.reason.as_deref()), false)
        .field(
            "Timestamp",
            discord_timestamp(infraction.created_at, 'f'),
            false,
        )
        .field("Status", status_text(infraction), false);
    with_thumbnail(embed, member.avatar_url.as_deref().or(guild_icon))
}

/// One entry of a member's infraction list.
pub fn list_entry(infraction: &Infraction) -> String {
    format!(
        "**ID:** `{}` - {}\n**Type:** {} - **Reason:** *{}* - {}",
        infraction.infraction_id,
        discord_timestamp(infraction.created_at, 'f'),
        infraction.infraction_type,
        reason_text(infraction.reason.as_deref()),
        status_text(infraction),
    )
}

#[cfg(test)]
mod tests {
    use chirp_database::model::infraction::{Infraction, InfractionStatus};

    use super::*;

    fn profile(id: u64, tag: &str) -> UserProfile {
        UserProfile {
            id,
            tag: tag.to_owned(),
            avatar_url: None,
        }
    }

    fn infraction(status: InfractionStatus, expires_at: Option<u64>) -> Infraction {
        Infraction {
            infraction_id: "AB12CD34".to_owned(),
            guild_id: 1,
            member_id: 2,
            infraction_type: "Strike".to_owned(),
            issued_by_id: 3,
            log_message_id: None,
            audit_message_id: None,
            reason: None,
            created_at: 1_700_000_000,
            expires_at,
            status,
        }
    }

    #[test]
    fn log_description_defaults_reason() {
        let record = infraction(InfractionStatus::Active, None);
        let text = log_description(&profile(2, "member"), InfractionSummary::from(&record));

        assert_eq!(
            text,
            "**member**, you have been infracted.\n\n\
             > **Infraction Type:** Strike\n\
             > **Reason:** No reason provided\n\
             > **Infraction ID:** AB12CD34"
        );
    }

    #[test]
    fn audit_description_mentions_both_parties() {
        let mut record = infraction(InfractionStatus::Active, Some(1_700_003_600));
        record.reason = Some("@everyone spam".to_owned());
        let text = audit_description(
            &profile(2, "member"),
            &profile(3, "staff"),
            InfractionSummary::from(&record),
        );

        assert!(text.contains("> **Member Infracted:** <@2>"));
        assert!(text.contains("> **Infracted By:** <@3>"));
        assert!(text.contains("> **Reason:** @\u{200B}everyone spam"));
        assert!(text.ends_with("> **Expires:** <t:1700003600:f> (<t:1700003600:R>)"));
    }

    #[test]
    fn revoked_description_names_the_revoker() {
        let record = infraction(InfractionStatus::Active, None);
        let text = revoked_description(
            &profile(2, "member"),
            &profile(9, "lead"),
            InfractionSummary::from(&record),
        );

        assert!(text.starts_with("***Infraction ID AB12CD34 has been revoked by lead (9)***"));
        assert!(text.contains("> **Member:** member `(2)`"));
        assert!(text.contains("> **Issued At:** <t:1700000000:f>"));
    }

    #[test]
    fn status_reflects_expiry() {
        assert_eq!(status_text(&infraction(InfractionStatus::Active, None)), "Active");
        assert_eq!(
            status_text(&infraction(InfractionStatus::Active, Some(5))),
            "Active, expires <t:5:R>"
        );
        assert_eq!(
            status_text(&infraction(InfractionStatus::Expired, Some(5))),
            "Expired"
        );
    }
}
