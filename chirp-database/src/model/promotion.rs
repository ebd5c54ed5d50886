use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub promotion_id: String,
    pub guild_id: u64,
    pub member_id: u64,
    pub new_role_id: u64,
    pub issued_by_id: u64,
    pub log_message_id: Option<u64>,
    pub audit_message_id: Option<u64>,
    pub reason: Option<String>,
    pub created_at: u64,
}
