use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context as _;
use tracing::warn;

pub const DEFAULT_API_PORT: u16 = 6248;
pub const DEFAULT_SWEEP_SECONDS: u64 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackendKind {
    Memory,
    Redis,
    Disabled,
}

impl CacheBackendKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(Self::Memory),
            "redis" => Some(Self::Redis),
            "none" | "disabled" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Settings read from the environment at start-up.
#[derive(Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub guild_id: Option<u64>,
    pub owner_id: Option<u64>,
    pub cache_backend: CacheBackendKind,
    pub redis_url: Option<String>,
    pub cache_key_prefix: String,
    pub auto_run_migrations: bool,
    pub api_enabled: bool,
    pub api_addr: SocketAddr,
    pub api_token: Option<String>,
    pub secret_key: Option<String>,
    pub infraction_sweep: Duration,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(vars: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let discord_token = vars("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?;
        let database_url = vars("DATABASE_URL").context("DATABASE_URL is not set")?;

        let cache_backend = match env_string(&vars, "CACHE_BACKEND") {
            Some(raw) => CacheBackendKind::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown CACHE_BACKEND; using the in-memory cache");
                CacheBackendKind::Memory
            }),
            None => CacheBackendKind::Memory,
        };

        let api_host = env_string(&vars, "API_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let api_port = env_string(&vars, "API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_API_PORT);
        let api_addr = format!("{api_host}:{api_port}")
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid API listen address {api_host}:{api_port}"))?;

        let api_token = ["API_TOKEN", "APITKN", "apitkn"]
            .into_iter()
            .find_map(|key| env_string(&vars, key));

        Ok(Self {
            discord_token,
            database_url,
            database_max_connections: u32::try_from(env_u64(&vars, "DATABASE_MAX_CONNECTIONS", 5))
                .unwrap_or(5)
                .max(1),
            guild_id: env_snowflake(&vars, "DISCORD_GUILD_ID"),
            owner_id: env_snowflake(&vars, "OWNER_ID"),
            cache_backend,
            redis_url: env_string(&vars, "REDIS_URL"),
            cache_key_prefix: env_string(&vars, "CACHE_KEY_PREFIX")
                .unwrap_or_else(|| "chirp".to_owned()),
            auto_run_migrations: env_bool(&vars, "AUTO_RUN_MIGRATIONS", true),
            api_enabled: env_bool(&vars, "API_ENABLED", true),
            api_addr,
            api_token,
            secret_key: env_string(&vars, "SECRET_KEY"),
            infraction_sweep: Duration::from_secs(
                env_u64(&vars, "INFRACTION_SWEEP_SECONDS", DEFAULT_SWEEP_SECONDS).max(1),
            ),
        })
    }
}

fn env_string(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn env_bool(vars: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match env_string(vars, key).map(|value| value.to_ascii_lowercase()) {
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

fn env_u64(vars: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    match env_string(vars, key) {
        Some(value) => value.parse::<u64>().unwrap_or(default),
        None => default,
    }
}

fn env_snowflake(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    env_string(vars, key)?.parse::<u64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<BotConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DISCORD_TOKEN", "token"),
        ("DATABASE_URL", "postgres://localhost/chirp"),
    ];

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&REQUIRED).unwrap();

        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.guild_id, None);
        assert_eq!(config.cache_backend, CacheBackendKind::Memory);
        assert_eq!(config.cache_key_prefix, "chirp");
        assert!(config.auto_run_migrations);
        assert!(config.api_enabled);
        assert_eq!(config.api_addr, "0.0.0.0:6248".parse().unwrap());
        assert_eq!(config.api_token, None);
        assert_eq!(config.infraction_sweep, Duration::from_secs(60));
    }

    #[test]
    fn required_values_are_enforced() {
        assert!(config_from(&[("DISCORD_TOKEN", "token")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "postgres://localhost/chirp")]).is_err());
    }

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("AUTO_RUN_MIGRATIONS", "maybe"),
            ("API_ENABLED", "off"),
            ("API_PORT", "http"),
            ("CACHE_BACKEND", "memcached"),
            ("DISCORD_GUILD_ID", "not-a-guild"),
            ("INFRACTION_SWEEP_SECONDS", "0"),
        ]);
        let config = config_from(&pairs).unwrap();

        assert!(config.auto_run_migrations);
        assert!(!config.api_enabled);
        assert_eq!(config.api_addr.port(), 6248);
        assert_eq!(config.cache_backend, CacheBackendKind::Memory);
        assert_eq!(config.guild_id, None);
        assert_eq!(config.infraction_sweep, Duration::from_secs(1));
    }

    #[test]
    fn out_of_range_port_falls_back_to_default() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("API_PORT", "99999"));
        let config = config_from(&pairs).unwrap();
        assert_eq!(config.api_addr.port(), 6248);

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("API_PORT", "8080"));
        let config = config_from(&pairs).unwrap();
        assert_eq!(config.api_addr.port(), 8080);
    }

    #[test]
    fn api_token_accepts_legacy_names() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("apitkn", "legacy"), ("CACHE_BACKEND", "none")]);
        let config = config_from(&pairs).unwrap();

        assert_eq!(config.api_token.as_deref(), Some("legacy"));
        assert_eq!(config.cache_backend, CacheBackendKind::Disabled);
    }
}
