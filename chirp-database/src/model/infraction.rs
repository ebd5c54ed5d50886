use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfractionStatus {
    Active,
    Expired,
}

impl InfractionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "expired" => Self::Expired,
            _ => Self::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infraction {
    pub infraction_id: String,
    pub guild_id: u64,
    pub member_id: u64,
    pub infraction_type: String,
    pub issued_by_id: u64,
    pub log_message_id: Option<u64>,
    pub audit_message_id: Option<u64>,
    pub reason: Option<String>,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    pub status: InfractionStatus,
}

impl Infraction {
    pub fn is_due(&self, now: u64) -> bool {
        self.status == InfractionStatus::Active && self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Just enough to re-arm an expiry timer after a restart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingExpiry {
    pub infraction_id: String,
    pub guild_id: u64,
    pub expires_at: u64,
}
