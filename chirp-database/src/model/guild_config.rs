use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys never shown to staff or the dashboard.
pub const RESERVED_KEYS: &[&str] = &["_id", "guild_id"];

/// Longest infraction type label kept from stored data (autocomplete limit).
pub const MAX_INFRACTION_TYPE_LEN: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKind {
    Role,
    Channel,
    List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    PromotionIssuerRole,
    InfractionIssuerRole,
    PromotionLog,
    PromotionAuditLog,
    InfractionLog,
    InfractionAuditLog,
    InfractionTypes,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::PromotionIssuerRole,
        ConfigKey::InfractionIssuerRole,
        ConfigKey::PromotionLog,
        ConfigKey::PromotionAuditLog,
        ConfigKey::InfractionLog,
        ConfigKey::InfractionAuditLog,
        ConfigKey::InfractionTypes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PromotionIssuerRole => "promotion_issuer_role",
            Self::InfractionIssuerRole => "infraction_issuer_role",
            Self::PromotionLog => "promotion_log",
            Self::PromotionAuditLog => "promotion_audit_log",
            Self::InfractionLog => "infraction_log",
            Self::InfractionAuditLog => "infraction_audit_log",
            Self::InfractionTypes => "infraction_types",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PromotionIssuerRole => "Promotion Issuer Role",
            Self::InfractionIssuerRole => "Infraction Issuer Role",
            Self::PromotionLog => "Promotion Log Channel",
            Self::PromotionAuditLog => "Promotion Audit Log Channel",
            Self::InfractionLog => "Infraction Log Channel",
            Self::InfractionAuditLog => "Infraction Audit Log Channel",
            Self::InfractionTypes => "Infraction Types",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::PromotionIssuerRole => "Role assigned to members who can promote others",
            Self::InfractionIssuerRole => "Role assigned to members who can issue infractions",
            Self::PromotionLog => "Channel to send promotions in",
            Self::PromotionAuditLog => "The channel to send promotion logs to",
            Self::InfractionLog => "The channel to send infractions to",
            Self::InfractionAuditLog => "The channel to send infraction logs to",
            Self::InfractionTypes => "Add/Remove infraction types",
        }
    }

    pub fn kind(self) -> ConfigKind {
        match self {
            Self::PromotionIssuerRole | Self::InfractionIssuerRole => ConfigKind::Role,
            Self::InfractionTypes => ConfigKind::List,
            _ => ConfigKind::Channel,
        }
    }
}

/// A guild's settings document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildConfig {
    settings: Map<String, Value>,
}

impl GuildConfig {
    pub fn from_map(settings: Map<String, Value>) -> Self {
        Self { settings }
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Configured role id for a role key.
    pub fn role(&self, key: ConfigKey) -> Option<u64> {
        self.snowflake(key.as_str())
    }

    /// Configured channel id for a channel key.
    pub fn channel(&self, key: ConfigKey) -> Option<u64> {
        self.snowflake(key.as_str())
    }

    fn snowflake(&self, key: &str) -> Option<u64> {
        match self.settings.get(key)? {
            Value::String(raw) => raw.trim().parse::<u64>().ok().filter(|id| *id > 0),
            Value::Number(number) => number.as_u64().filter(|id| *id > 0),
            _ => None,
        }
    }

    /// Configured infraction types, cleaned for display and matching.
    ///
    /// Stored data may be an array or a single string. Entries are trimmed,
    /// empty ones dropped, long ones truncated, duplicates removed in order.
    pub fn infraction_types(&self) -> Vec<String> {
        let raw: Vec<&Value> = match self.settings.get(ConfigKey::InfractionTypes.as_str()) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        };

        let mut cleaned: Vec<String> = Vec::with_capacity(raw.len());
        for entry in raw.into_iter().filter_map(clean_type_entry) {
            if !cleaned.contains(&entry) {
                cleaned.push(entry);
            }
        }

        cleaned
    }

    /// Remove every stored infraction type whose cleaned form is `wanted`,
    /// so whatever the menu listed can be removed. Returns whether the
    /// document changed.
    pub fn pull_infraction_type(&mut self, wanted: &str) -> bool {
        let key = ConfigKey::InfractionTypes.as_str();
        let wanted = wanted.trim();
        let matching: Vec<Value> = match self.settings.get(key) {
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
            None => return false,
        }
        .into_iter()
        .filter(|item| clean_type_entry(item).as_deref() == Some(wanted))
        .collect();

        let mut changed = false;
        for item in &matching {
            changed |= self.pull(key, item);
        }
        changed
    }

    pub fn has_infraction_type(&self, wanted: &str) -> bool {
        self.infraction_types().iter().any(|entry| entry == wanted)
    }

    /// Settings minus reserved keys, in stored order.
    pub fn display_entries(&self) -> Map<String, Value> {
        self.settings
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// `$set`: overwrite every given key. Reserved keys are ignored.
    pub fn merge_set(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            self.settings.insert(key, value);
        }
    }

    /// `$addToSet`: append `value` to the array at `key` unless present.
    /// Returns whether the document changed.
    pub fn add_to_set(&mut self, key: &str, value: Value) -> bool {
        let entry = self
            .settings
            .entry(key.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));

        if !entry.is_array() {
            let previous = std::mem::take(entry);
            *entry = match previous {
                Value::Null => Value::Array(Vec::new()),
                other => Value::Array(vec![other]),
            };
        }

        let Value::Array(items) = entry else {
            return false;
        };

        if items.contains(&value) {
            return false;
        }

        items.push(value);
        true
    }

    /// `$pull`: remove every occurrence of `value` from the array at `key`.
    /// A scalar equal to `value` becomes an empty array. Returns whether the
    /// document changed.
    pub fn pull(&mut self, key: &str, value: &Value) -> bool {
        let Some(entry) = self.settings.get_mut(key) else {
            return false;
        };

        match entry {
            Value::Array(items) => {
                let before = items.len();
                items.retain(|item| item != value);
                before != items.len()
            }
            other => {
                if *other != *value {
                    return false;
                }
                *other = Value::Array(Vec::new());
                true
            }
        }
    }
}

/// One stored infraction type as staff see it: trimmed and truncated.
/// `None` for nulls and blank entries.
fn clean_type_entry(item: &Value) -> Option<String> {
    let raw = match item {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let cleaned: String = raw.trim().chars().take(MAX_INFRACTION_TYPE_LEN).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Turn a settings key into a display label: `infraction_log` -> `Infraction Log`.
pub fn pretty_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!(
                    "{}{}",
                    first.to_uppercase(),
                    chars.as_str().to_ascii_lowercase()
                ),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(value: Value) -> GuildConfig {
        match value {
            Value::Object(map) => GuildConfig::from_map(map),
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn reads_role_and_channel_ids() {
        let cfg = config(json!({
            "infraction_issuer_role": "123",
            "infraction_log": 456,
            "promotion_log": "not-a-number",
            "promotion_audit_log": "0",
        }));

        assert_eq!(cfg.role(ConfigKey::InfractionIssuerRole), Some(123));
        assert_eq!(cfg.channel(ConfigKey::InfractionLog), Some(456));
        assert_eq!(cfg.channel(ConfigKey::PromotionLog), None);
        assert_eq!(cfg.channel(ConfigKey::PromotionAuditLog), None);
        assert_eq!(cfg.role(ConfigKey::PromotionIssuerRole), None);
    }

    #[test]
    fn cleans_infraction_types() {
        let long = "x".repeat(150);
        let cfg = config(json!({
            "infraction_types": [" Strike ", "Warning", "", null, "Strike", long, 3]
        }));

        let types = cfg.infraction_types();
        assert_eq!(types.len(), 4);
        assert_eq!(types[0], "Strike");
        assert_eq!(types[1], "Warning");
        assert_eq!(types[2].len(), MAX_INFRACTION_TYPE_LEN);
        assert_eq!(types[3], "3");
    }

    #[test]
    fn scalar_infraction_type_is_a_single_entry() {
        let cfg = config(json!({ "infraction_types": "Activity Notice" }));
        assert_eq!(cfg.infraction_types(), vec!["Activity Notice".to_owned()]);
        assert!(cfg.has_infraction_type("Activity Notice"));
        assert!(!cfg.has_infraction_type("activity notice"));
    }

    #[test]
    fn add_to_set_and_pull() {
        let mut cfg = GuildConfig::default();
        assert!(cfg.add_to_set("infraction_types", json!("Strike")));
        assert!(!cfg.add_to_set("infraction_types", json!("Strike")));
        assert!(cfg.add_to_set("infraction_types", json!("Warning")));
        assert_eq!(cfg.get("infraction_types"), Some(&json!(["Strike", "Warning"])));

        assert!(cfg.pull("infraction_types", &json!("Strike")));
        assert!(!cfg.pull("infraction_types", &json!("Strike")));
        assert_eq!(cfg.get("infraction_types"), Some(&json!(["Warning"])));
        assert!(!cfg.pull("missing", &json!("Strike")));
    }

    #[test]
    fn infraction_types_are_removed_by_their_listed_form() {
        let mut cfg = config(json!({ "infraction_types": "Strike" }));
        assert!(cfg.pull_infraction_type("Strike"));
        assert!(cfg.infraction_types().is_empty());
        assert!(!cfg.pull_infraction_type("Strike"));

        let mut cfg = config(json!({ "infraction_types": [" Strike ", "Warning", "Strike"] }));
        assert_eq!(cfg.infraction_types(), vec!["Strike".to_owned(), "Warning".to_owned()]);
        assert!(cfg.pull_infraction_type("Strike"));
        assert_eq!(cfg.get("infraction_types"), Some(&json!(["Warning"])));

        let long = "x".repeat(MAX_INFRACTION_TYPE_LEN + 20);
        let mut cfg = config(json!({ "infraction_types": [long] }));
        let listed = cfg.infraction_types().remove(0);
        assert!(cfg.pull_infraction_type(&listed));
        assert_eq!(cfg.get("infraction_types"), Some(&json!([])));
    }

    #[test]
    fn missing_infraction_type_leaves_document_alone() {
        let mut cfg = config(json!({ "infraction_types": ["Warning"] }));
        assert!(!cfg.pull_infraction_type("Strike"));
        assert_eq!(cfg.get("infraction_types"), Some(&json!(["Warning"])));

        let mut cfg = GuildConfig::default();
        assert!(!cfg.pull_infraction_type("Strike"));
        assert_eq!(cfg.get("infraction_types"), None);
    }

    #[test]
    fn add_to_set_wraps_scalars() {
        let mut cfg = config(json!({ "infraction_types": "Strike" }));
        assert!(cfg.add_to_set("infraction_types", json!("Warning")));
        assert_eq!(cfg.get("infraction_types"), Some(&json!(["Strike", "Warning"])));
    }

    #[test]
    fn merge_set_skips_reserved_keys() {
        let mut cfg = config(json!({ "infraction_log": "1" }));
        let patch = match json!({ "infraction_log": "2", "guild_id": "9", "_id": "x", "extra": true }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        cfg.merge_set(patch);

        assert_eq!(cfg.get("infraction_log"), Some(&json!("2")));
        assert_eq!(cfg.get("extra"), Some(&json!(true)));
        assert_eq!(cfg.get("guild_id"), None);
        assert_eq!(cfg.get("_id"), None);
    }

    #[test]
    fn display_entries_strip_reserved_keys() {
        let cfg = config(json!({ "guild_id": "1", "_id": "abc", "promotion_log": "2" }));
        let entries = cfg.display_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("promotion_log"));
    }

    #[test]
    fn config_keys_round_trip_and_classify() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(ConfigKey::InfractionIssuerRole.kind(), ConfigKind::Role);
        assert_eq!(ConfigKey::PromotionAuditLog.kind(), ConfigKind::Channel);
        assert_eq!(ConfigKey::InfractionTypes.kind(), ConfigKind::List);
        assert_eq!(ConfigKey::from_key("prefix"), None);
    }

    #[test]
    fn pretty_keys() {
        assert_eq!(pretty_key("infraction_audit_log"), "Infraction Audit Log");
        assert_eq!(pretty_key("promotion_issuer_role"), "Promotion Issuer Role");
        assert_eq!(pretty_key("_id"), "Id");
    }
}
