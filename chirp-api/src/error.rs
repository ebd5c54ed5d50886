use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to dashboard clients as `{"detail": "..."}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("missing api token")]
    MissingToken,

    #[error("invalid api token")]
    InvalidToken,

    #[error("missing signature/timestamp")]
    MissingSignature,

    #[error("invalid timestamp")]
    InvalidTimestamp,

    #[error("timestamp expired")]
    TimestampExpired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("authentication not configured")]
    AuthNotConfigured,

    #[error("bot_not_in_guild")]
    BotNotInGuild,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::TimestampExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::InvalidSignature => StatusCode::FORBIDDEN,
            Self::MissingSignature | Self::InvalidTimestamp | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::BotNotInGuild => StatusCode::NOT_FOUND,
            Self::AuthNotConfigured | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_failure_kind() {
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidTimestamp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::BotNotInGuild.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::AuthNotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::BotNotInGuild.to_string(), "bot_not_in_guild");
    }
}
