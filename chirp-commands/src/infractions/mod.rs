mod embeds;
pub mod expiry;
mod infract;
mod list;
mod revoke;
mod view;

use poise::serenity_prelude as serenity;

use chirp_core::{Context, Error};
use chirp_database::impls::guild_config::get_guild_config;

use crate::CommandMeta;
use infract::infract;
use list::list;
use revoke::revoke;
use view::view;

pub const META: CommandMeta = CommandMeta {
    name: "infractions",
    desc: "Issue, view, list and revoke staff infractions.",
    category: "staff",
    usage: "/infractions <infract|view|revoke|list>",
};

/// Autocomplete choices returned at most, per Discord's limit.
const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

/// Value of the placeholder choice offered when nothing matches.
const NO_TYPES_VALUE: &str = "none";

/// Infractions management commands.
#[poise::command(
    slash_command,
    category = "Staff",
    subcommands("infract", "view", "revoke", "list"),
    subcommand_required
)]
pub async fn infractions(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

async fn autocomplete_infraction_type(
    ctx: Context<'_>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let types = match ctx.guild_id() {
        Some(guild_id) => match get_guild_config(&ctx.data().db, guild_id.get()).await {
            Ok(config) => config.infraction_types(),
            Err(source) => {
                tracing::warn!(?source, "failed to load infraction types for autocomplete");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let matches = matching_types(&types, partial);
    if matches.is_empty() {
        return vec![serenity::AutocompleteChoice::new(
            "No infraction types set",
            NO_TYPES_VALUE,
        )];
    }

    matches
        .into_iter()
        .map(|entry| serenity::AutocompleteChoice::new(entry.clone(), entry))
        .collect()
}

/// Types containing `partial`, case-insensitively, capped for Discord.
fn matching_types(types: &[String], partial: &str) -> Vec<String> {
    let needle = partial.trim().to_lowercase();
    types
        .iter()
        .filter(|entry| needle.is_empty() || entry.to_lowercase().contains(&needle))
        .take(MAX_AUTOCOMPLETE_CHOICES)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::matching_types;

    fn types(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    #[test]
    fn filters_case_insensitively() {
        let all = types(&["Strike", "Warning", "Activity Notice"]);
        assert_eq!(matching_types(&all, "stri"), types(&["Strike"]));
        assert_eq!(matching_types(&all, "NOT"), types(&["Activity Notice"]));
        assert_eq!(matching_types(&all, ""), all);
        assert!(matching_types(&all, "ban").is_empty());
    }

    #[test]
    fn caps_at_twenty_five() {
        let many: Vec<String> = (0..40).map(|n| format!("Type {n}")).collect();
        assert_eq!(matching_types(&many, "type").len(), 25);
    }
}
