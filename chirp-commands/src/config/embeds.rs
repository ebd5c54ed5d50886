use poise::serenity_prelude as serenity;
use serde_json::{Map, Value};

use chirp_database::model::guild_config::{ConfigKey, GuildConfig, pretty_key};
use chirp_utils::embed::titled_embed;
use chirp_utils::formatting::{channel_mention, role_mention};

pub fn menu_embed(thumbnail: Option<&str>) -> serenity::CreateEmbed {
    titled_embed(
        "Configuration Menu",
        "Select the setting you want to configure from the menu below.",
        thumbnail,
    )
}

pub fn expired_embed(thumbnail: Option<&str>) -> serenity::CreateEmbed {
    titled_embed(
        "Configuration Menu Expired",
        "You did not make a selection in time. Please run the command again to configure settings.",
        thumbnail,
    )
}

pub fn updated_embed(key: ConfigKey, value_mention: &str, thumbnail: Option<&str>) -> serenity::CreateEmbed {
    titled_embed(
        "Configuration Updated",
        format!("Set **{}** to {}.", key.label(), value_mention),
        thumbnail,
    )
}

/// Closes the menu when a selection arrives that cannot be applied.
pub fn unchanged_embed(thumbnail: Option<&str>) -> serenity::CreateEmbed {
    titled_embed(
        "No Changes Made",
        "That selection could not be applied. Please run the command again.",
        thumbnail,
    )
}

/// Title and body reporting an infraction type removal.
pub fn removal_message(infraction_type: &str, removed: bool) -> (&'static str, String) {
    if removed {
        (
            "Infraction Type Removed",
            format!("Successfully removed infraction type: **{infraction_type}**"),
        )
    } else {
        (
            "Infraction Type Not Found",
            format!("**{infraction_type}** is not an infraction type."),
        )
    }
}

/// What `/config view` shows for a guild.
#[derive(Debug, PartialEq)]
pub enum ConfigView {
    /// No stored document.
    Missing,
    /// A document exists but holds nothing displayable.
    Empty,
    Entries(Map<String, Value>),
}

impl ConfigView {
    pub fn new(exists: bool, config: &GuildConfig) -> Self {
        let entries = config.display_entries();
        match (exists, entries.is_empty()) {
            (false, true) => Self::Missing,
            (true, true) => Self::Empty,
            (_, false) => Self::Entries(entries),
        }
    }
}

/// One line per stored setting, mentions resolved from the key name.
pub fn render_config_lines(entries: &Map<String, Value>) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{}: {}", pretty_key(key), render_value(key, value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(key: &str, value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "(empty)".to_owned(),
        Value::Array(items) => items
            .iter()
            .map(plain_text)
            .collect::<Vec<_>>()
            .join(", "),
        scalar => {
            let text = plain_text(scalar);
            let id = text.trim().parse::<u64>().ok();
            match id {
                Some(id) if key.contains("role") => role_mention(id),
                Some(id) if key.contains("channel") || key.contains("log") => channel_mention(id),
                _ => text,
            }
        }
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use chirp_database::model::guild_config::GuildConfig;

    use super::{ConfigView, removal_message, render_config_lines, unchanged_embed};

    fn entries(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn renders_mentions_by_key_kind() {
        let text = render_config_lines(&entries(json!({
            "infraction_issuer_role": "111",
            "infraction_log": "222",
            "infraction_types": ["Strike", "Warning"],
        })));

        assert_eq!(
            text,
            "Infraction Issuer Role: <@&111>\n\
             Infraction Log: <#222>\n\
             Infraction Types: Strike, Warning"
        );
    }

    #[test]
    fn renders_empty_lists_and_unknown_keys() {
        let text = render_config_lines(&entries(json!({
            "infraction_types": [],
            "welcome_text": "hello",
            "promotion_log": "not-an-id",
        })));

        assert!(text.contains("Infraction Types: (empty)"));
        assert!(text.contains("Welcome Text: hello"));
        assert!(text.contains("Promotion Log: not-an-id"));
    }

    #[test]
    fn removal_reports_missing_types() {
        let (title, body) = removal_message("Strike", true);
        assert_eq!(title, "Infraction Type Removed");
        assert!(body.contains("**Strike**"));

        let (title, body) = removal_message("Strike", false);
        assert_eq!(title, "Infraction Type Not Found");
        assert_eq!(body, "**Strike** is not an infraction type.");
    }

    #[test]
    fn unchanged_menu_has_no_success_wording() {
        let embed = serde_json::to_value(unchanged_embed(None)).unwrap();
        assert_eq!(embed["title"], "No Changes Made");
        assert!(embed.get("thumbnail").is_none());
    }

    #[test]
    fn view_tells_missing_from_empty_documents() {
        let empty = GuildConfig::default();
        assert_eq!(ConfigView::new(false, &empty), ConfigView::Missing);
        assert_eq!(ConfigView::new(true, &empty), ConfigView::Empty);

        let reserved_only = GuildConfig::from_map(entries(json!({ "guild_id": "1" })));
        assert_eq!(ConfigView::new(true, &reserved_only), ConfigView::Empty);

        let set = GuildConfig::from_map(entries(json!({ "infraction_log": "222" })));
        assert_eq!(
            ConfigView::new(true, &set),
            ConfigView::Entries(entries(json!({ "infraction_log": "222" })))
        );
    }
}
