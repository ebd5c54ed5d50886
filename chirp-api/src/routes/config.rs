use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::ApiState;
use crate::error::ApiError;
use chirp_database::impls::guild_config::{get_guild_config, merge_guild_config};

/// Resolve the path segment to a guild the bot is in.
fn known_guild(state: &ApiState, raw: &str) -> Result<u64, ApiError> {
    let guild_id = raw.trim().parse::<u64>().ok().filter(|id| *id > 0);
    match guild_id {
        Some(guild_id) if state.directory.contains(guild_id) => Ok(guild_id),
        _ => {
            warn!(guild_id = raw, "guild not found in bot cache");
            Err(ApiError::BotNotInGuild)
        }
    }
}

pub async fn get_config(
    State(state): State<ApiState>,
    Path(guild_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let guild_id = known_guild(&state, &guild_id)?;

    let config = get_guild_config(&state.db, guild_id).await.map_err(|e| {
        error!(?e, guild_id, "failed to load guild config");
        ApiError::Internal("failed to load configuration".to_owned())
    })?;

    Ok(Json(json!({
        "ok": true,
        "guild_id": guild_id.to_string(),
        "config": config.display_entries(),
    })))
}

pub async fn update_config(
    State(state): State<ApiState>,
    Path(guild_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let guild_id = known_guild(&state, &guild_id)?;

    let patch: Map<String, Value> = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("payload must be a JSON object".to_owned()))?;

    match merge_guild_config(&state.db, guild_id, patch).await {
        Ok(config) => {
            info!(guild_id, "guild config updated from dashboard");
            Ok(Json(json!({
                "ok": true,
                "guild_id": guild_id.to_string(),
                "config": config.display_entries(),
            })))
        }
        Err(e) => {
            error!(?e, guild_id, "failed to update guild config");
            Ok(Json(json!({ "ok": false, "error": e.to_string() })))
        }
    }
}
