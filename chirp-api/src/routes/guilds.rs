use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::ApiState;

pub async fn list_guilds(State(state): State<ApiState>) -> Json<Value> {
    let guilds = state.directory.guilds();
    Json(json!({ "ok": true, "guilds": guilds }))
}
