use serde_json::{Map, Value};
use sqlx::types::Json;

use crate::cache::{CONFIG_CACHE_TTL, guild_config_key};
use crate::database::Database;
use crate::impls::{now_unix_secs, to_db_id};
use crate::model::guild_config::{ConfigKey, GuildConfig, RESERVED_KEYS};

/// Read a guild's settings, through the cache. A guild without a document
/// yields an empty config.
pub async fn get_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || {
            load_guild_config(db, guild_id)
        })
        .await
}

async fn load_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;

    let settings: Option<Json<Map<String, Value>>> =
        sqlx::query_scalar("SELECT settings FROM guild_config WHERE guild_id = $1")
            .bind(guild_id_i64)
            .fetch_optional(db.pool())
            .await?;

    Ok(settings
        .map(|Json(settings)| GuildConfig::from_map(settings))
        .unwrap_or_default())
}

/// Whether the guild has a stored document at all, empty or not.
pub async fn guild_config_exists(db: &Database, guild_id: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guild_config WHERE guild_id = $1)")
            .bind(guild_id_i64)
            .fetch_one(db.pool())
            .await?;

    Ok(exists)
}

/// Re-read the document from the database and overwrite the cached copy.
pub async fn refresh_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    let config = load_guild_config(db, guild_id).await?;
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .mirror_json(&cache_key, &config, CONFIG_CACHE_TTL)
        .await;
    Ok(config)
}

/// Upsert a single setting.
pub async fn set_config_value(
    db: &Database,
    guild_id: u64,
    key: ConfigKey,
    value: Value,
) -> anyhow::Result<GuildConfig> {
    let mut patch = Map::new();
    patch.insert(key.as_str().to_owned(), value);
    merge_guild_config(db, guild_id, patch).await
}

/// Merge `patch` into the guild's document, creating it if needed, and
/// return the stored result. Reserved keys in `patch` are dropped.
pub async fn merge_guild_config(
    db: &Database,
    guild_id: u64,
    mut patch: Map<String, Value>,
) -> anyhow::Result<GuildConfig> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;
    let now = to_db_id(now_unix_secs(), "updated_at")?;
    patch.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

    let Json(settings): Json<Map<String, Value>> = sqlx::query_scalar(
        "INSERT INTO guild_config (guild_id, settings, updated_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (guild_id) DO UPDATE
         SET settings = guild_config.settings || EXCLUDED.settings,
             updated_at = EXCLUDED.updated_at
         RETURNING settings",
    )
    .bind(guild_id_i64)
    .bind(Json(&patch))
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    let config = GuildConfig::from_map(settings);
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .mirror_json(&cache_key, &config, CONFIG_CACHE_TTL)
        .await;

    Ok(config)
}

/// Add an infraction type. Returns the new config and whether it changed.
pub async fn add_infraction_type(
    db: &Database,
    guild_id: u64,
    infraction_type: &str,
) -> anyhow::Result<(GuildConfig, bool)> {
    let value = Value::String(infraction_type.trim().to_owned());
    update_document(db, guild_id, true, |config| {
        config.add_to_set(ConfigKey::InfractionTypes.as_str(), value)
    })
    .await
}

/// Remove an infraction type as it is listed to staff. Returns the new
/// config and whether it changed.
pub async fn remove_infraction_type(
    db: &Database,
    guild_id: u64,
    infraction_type: &str,
) -> anyhow::Result<(GuildConfig, bool)> {
    update_document(db, guild_id, false, |config| {
        config.pull_infraction_type(infraction_type)
    })
    .await
}

/// Row-locked read-modify-write of a guild's document.
async fn update_document<F>(
    db: &Database,
    guild_id: u64,
    upsert: bool,
    apply: F,
) -> anyhow::Result<(GuildConfig, bool)>
where
    F: FnOnce(&mut GuildConfig) -> bool,
{
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;
    let now = to_db_id(now_unix_secs(), "updated_at")?;

    let mut tx = db.pool().begin().await?;

    if upsert {
        sqlx::query(
            "INSERT INTO guild_config (guild_id, settings, updated_at)
             VALUES ($1, '{}'::jsonb, $2)
             ON CONFLICT (guild_id) DO NOTHING",
        )
        .bind(guild_id_i64)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    let current: Option<Json<Map<String, Value>>> =
        sqlx::query_scalar("SELECT settings FROM guild_config WHERE guild_id = $1 FOR UPDATE")
            .bind(guild_id_i64)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(Json(settings)) = current else {
        tx.rollback().await?;
        return Ok((GuildConfig::default(), false));
    };

    let mut config = GuildConfig::from_map(settings);
    let changed = apply(&mut config);

    if changed {
        sqlx::query("UPDATE guild_config SET settings = $2, updated_at = $3 WHERE guild_id = $1")
            .bind(guild_id_i64)
            .bind(Json(&config))
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .mirror_json(&cache_key, &config, CONFIG_CACHE_TTL)
        .await;

    Ok((config, changed))
}
