use std::fmt;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::ApiState;
use crate::error::ApiError;
use chirp_utils::time::now_unix_secs;

type HmacSha256 = Hmac<Sha256>;

/// Largest clock difference accepted on a signed request.
pub const SIGNATURE_WINDOW_SECS: u64 = 60;
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Credentials the dashboard must present. A token takes precedence over
/// request signing when both are configured.
#[derive(Clone, Default)]
pub struct ApiAuth {
    token: Option<String>,
    secret: Option<String>,
}

impl fmt::Debug for ApiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiAuth")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiAuth {
    pub fn new(token: Option<String>, secret: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            token: clean(token),
            secret: clean(secret),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some() || self.secret.is_some()
    }

    pub fn verify(&self, headers: &HeaderMap, body: &[u8], now: u64) -> Result<(), ApiError> {
        if let Some(token) = &self.token {
            let presented = presented_token(headers).ok_or(ApiError::MissingToken)?;
            return if tokens_match(token, presented) {
                Ok(())
            } else {
                Err(ApiError::InvalidToken)
            };
        }

        if let Some(secret) = &self.secret {
            return verify_signature(secret, headers, body, now);
        }

        Err(ApiError::AuthNotConfigured)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = header(headers, "authorization").and_then(|value| {
        let (scheme, token) = value.split_once(' ')?;
        scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
    });

    bearer
        .or_else(|| header(headers, "x-api-token").map(str::trim))
        .filter(|token| !token.is_empty())
}

/// Compare two tokens by their HMAC tags so the time taken does not depend
/// on where they first differ.
fn tokens_match(expected: &str, presented: &str) -> bool {
    let tag = |value: &str| {
        HmacSha256::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(value.as_bytes());
            mac
        })
    };

    let (Ok(expected_mac), Ok(presented_mac)) = (tag(expected), tag(presented)) else {
        return false;
    };

    presented_mac
        .verify_slice(&expected_mac.finalize().into_bytes())
        .is_ok()
}

/// Hex HMAC-SHA256 of `{timestamp}.{body}`, the value expected in
/// `X-Signature`.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn verify_signature(
    secret: &str,
    headers: &HeaderMap,
    body: &[u8],
    now: u64,
) -> Result<(), ApiError> {
    let (Some(signature), Some(timestamp)) =
        (header(headers, "x-signature"), header(headers, "x-timestamp"))
    else {
        return Err(ApiError::MissingSignature);
    };

    let issued_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidTimestamp)?;
    let now = i64::try_from(now).map_err(|_| ApiError::InvalidTimestamp)?;
    if now.abs_diff(issued_at) > SIGNATURE_WINDOW_SECS {
        return Err(ApiError::TimestampExpired);
    }

    let presented = hex::decode(signature.trim()).map_err(|_| ApiError::InvalidSignature)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Internal(format!("signing key rejected: {e}")))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);

    mac.verify_slice(&presented)
        .map_err(|_| ApiError::InvalidSignature)
}

/// Authenticate an `/api/*` request. The body is buffered so signed
/// requests can be checked, then handed on unchanged.
pub async fn require_auth(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(?e, path = %parts.uri.path(), "failed to read request body");
            return ApiError::BadRequest("invalid request body".to_owned()).into_response();
        }
    };

    if let Err(error) = state.auth.verify(&parts.headers, &bytes, now_unix_secs()) {
        warn!(path = %parts.uri.path(), %error, "rejected dashboard request");
        return error.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn token_auth_accepts_bearer_and_header() {
        let auth = ApiAuth::new(Some("s3cret".to_owned()), None);

        assert_eq!(
            auth.verify(&headers(&[("authorization", "Bearer s3cret")]), b"", NOW),
            Ok(())
        );
        assert_eq!(
            auth.verify(&headers(&[("authorization", "bearer  s3cret ")]), b"", NOW),
            Ok(())
        );
        assert_eq!(
            auth.verify(&headers(&[("x-api-token", "s3cret")]), b"", NOW),
            Ok(())
        );
    }

    #[test]
    fn token_auth_rejects_missing_and_wrong_tokens() {
        let auth = ApiAuth::new(Some("s3cret".to_owned()), Some("ignored".to_owned()));

        assert_eq!(
            auth.verify(&HeaderMap::new(), b"", NOW),
            Err(ApiError::MissingToken)
        );
        assert_eq!(
            auth.verify(&headers(&[("authorization", "Basic s3cret")]), b"", NOW),
            Err(ApiError::MissingToken)
        );
        assert_eq!(
            auth.verify(&headers(&[("x-api-token", "s3cre")]), b"", NOW),
            Err(ApiError::InvalidToken)
        );
    }

    #[test]
    fn signed_requests_are_checked_against_the_body() {
        let auth = ApiAuth::new(None, Some("signing-key".to_owned()));
        let body = br#"{"promotion_log":"123"}"#;
        let timestamp = NOW.to_string();
        let signature = sign("signing-key", &timestamp, body).unwrap();

        let valid = headers(&[
            ("x-signature", signature.as_str()),
            ("x-timestamp", timestamp.as_str()),
        ]);
        assert_eq!(auth.verify(&valid, body, NOW + 30), Ok(()));
        assert_eq!(
            auth.verify(&valid, b"{}", NOW),
            Err(ApiError::InvalidSignature)
        );
        assert_eq!(
            auth.verify(&valid, body, NOW + SIGNATURE_WINDOW_SECS + 1),
            Err(ApiError::TimestampExpired)
        );
    }

    #[test]
    fn malformed_signature_headers_are_rejected() {
        let auth = ApiAuth::new(None, Some("signing-key".to_owned()));

        assert_eq!(
            auth.verify(&headers(&[("x-signature", "abcd")]), b"", NOW),
            Err(ApiError::MissingSignature)
        );
        assert_eq!(
            auth.verify(
                &headers(&[("x-signature", "abcd"), ("x-timestamp", "yesterday")]),
                b"",
                NOW
            ),
            Err(ApiError::InvalidTimestamp)
        );
        assert_eq!(
            auth.verify(
                &headers(&[("x-signature", "not-hex"), ("x-timestamp", NOW.to_string().as_str())]),
                b"",
                NOW
            ),
            Err(ApiError::InvalidSignature)
        );
    }

    #[test]
    fn nothing_configured_is_a_server_error() {
        let auth = ApiAuth::new(Some("   ".to_owned()), None);
        assert!(!auth.is_configured());
        assert_eq!(
            auth.verify(&HeaderMap::new(), b"", NOW),
            Err(ApiError::AuthNotConfigured)
        );
    }
}
