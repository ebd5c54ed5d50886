use std::sync::Arc;

use serde::Serialize;
use serenity::all::{Cache, GuildId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuildSummary {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub member_count: Option<u64>,
}

/// The guilds the bot is currently in.
pub trait GuildDirectory: Send + Sync + 'static {
    fn guilds(&self) -> Vec<GuildSummary>;

    fn contains(&self, guild_id: u64) -> bool;
}

pub fn guild_icon_url(guild_id: u64, icon_hash: Option<&str>) -> Option<String> {
    let hash = icon_hash.filter(|hash| !hash.is_empty())?;
    Some(format!(
        "https://cdn.discordapp.com/icons/{guild_id}/{hash}.png?size=96"
    ))
}

/// Directory backed by the gateway cache.
#[derive(Clone)]
pub struct CacheDirectory {
    cache: Arc<Cache>,
}

impl CacheDirectory {
    pub fn new(cache: Arc<Cache>) -> Self {
        Self { cache }
    }
}

impl GuildDirectory for CacheDirectory {
    fn guilds(&self) -> Vec<GuildSummary> {
        self.cache
            .guilds()
            .into_iter()
            .filter_map(|guild_id| {
                let guild = self.cache.guild(guild_id)?;
                let icon = guild.icon.map(|hash| hash.to_string());
                Some(GuildSummary {
                    id: guild_id.get().to_string(),
                    name: guild.name.clone(),
                    icon: guild_icon_url(guild_id.get(), icon.as_deref()),
                    member_count: Some(guild.member_count),
                })
            })
            .collect()
    }

    fn contains(&self, guild_id: u64) -> bool {
        guild_id != 0 && self.cache.guild(GuildId::new(guild_id)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::guild_icon_url;

    #[test]
    fn icon_url_needs_a_hash() {
        assert_eq!(
            guild_icon_url(42, Some("abc123")).as_deref(),
            Some("https://cdn.discordapp.com/icons/42/abc123.png?size=96")
        );
        assert_eq!(guild_icon_url(42, None), None);
        assert_eq!(guild_icon_url(42, Some("")), None);
    }
}
