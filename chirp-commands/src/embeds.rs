use poise::serenity_prelude as serenity;

use chirp_core::{Context, Error};
use chirp_utils::embed::{success_embed, warning_embed};
use chirp_utils::formatting::user_mention;

/// Display name and avatar of a user referenced by a record.
#[derive(Clone, Debug)]
pub struct UserProfile {
    pub id: u64,
    pub tag: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn mention(&self) -> String {
        user_mention(self.id)
    }
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag)
    }
}

pub fn profile_from_user(user: &serenity::User) -> UserProfile {
    UserProfile {
        id: user.id.get(),
        tag: user.tag(),
        avatar_url: Some(user.face()),
    }
}

/// The bot's own profile from the gateway cache.
pub fn bot_profile(cache: &serenity::Cache) -> UserProfile {
    let user = cache.current_user();
    UserProfile {
        id: user.id.get(),
        tag: user.tag(),
        avatar_url: Some(user.face()),
    }
}

/// Look a user up by id, falling back to a placeholder when Discord has no
/// record of them any more.
pub async fn fetch_user_profile(http: &serenity::Http, user_id: u64) -> UserProfile {
    match http.get_user(serenity::UserId::new(user_id)).await {
        Ok(user) => profile_from_user(&user),
        Err(_) => UserProfile {
            id: user_id,
            tag: format!("Unknown user ({user_id})"),
            avatar_url: None,
        },
    }
}

/// Name and icon of the guild a record belongs to.
#[derive(Clone, Debug)]
pub struct GuildProfile {
    pub name: String,
    pub icon_url: Option<String>,
}

pub async fn fetch_guild_profile(http: &serenity::Http, guild_id: serenity::GuildId) -> GuildProfile {
    match guild_id.to_partial_guild(http).await {
        Ok(guild) => GuildProfile {
            icon_url: guild.icon_url(),
            name: guild.name,
        },
        Err(_) => GuildProfile {
            name: format!("Server {}", guild_id.get()),
            icon_url: None,
        },
    }
}

/// Icon of the invoking guild from the gateway cache.
pub fn cached_guild_icon(ctx: Context<'_>) -> Option<String> {
    ctx.guild().and_then(|guild| guild.icon_url())
}

/// Name of a guild role, from the cache when possible.
pub async fn resolve_role_name(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    role_id: u64,
) -> Option<String> {
    let role_id = serenity::RoleId::new(role_id);
    let cached = ctx
        .guild()
        .and_then(|guild| guild.roles.get(&role_id).map(|role| role.name.clone()));
    if cached.is_some() {
        return cached;
    }

    guild_id
        .roles(ctx.http())
        .await
        .ok()?
        .get(&role_id)
        .map(|role| role.name.clone())
}

/// Keep user-supplied text from pinging anyone when echoed into an embed.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub async fn send_warning(ctx: Context<'_>, text: impl AsRef<str>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(warning_embed(text))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn send_success(ctx: Context<'_>, text: impl AsRef<str>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(success_embed(text))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::sanitize_mentions;

    #[test]
    fn mentions_are_defused() {
        assert_eq!(sanitize_mentions("@everyone hi"), "@\u{200B}everyone hi");
        assert_eq!(sanitize_mentions("plain"), "plain");
    }
}
