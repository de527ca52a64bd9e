use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// Cookie the identity provider sets for browser sessions.
pub const SESSION_COOKIE: &str = "__session";

/// Claims of a session token issued by the identity provider. `sub` is the
/// provider's user id, which is what events and schedules are owned by.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub struct AuthService;

impl AuthService {
    /// Pull the raw session token out of a request: `Authorization: Bearer`
    /// first, then the session cookie.
    pub fn session_token(headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.len() > 7 && v[..7].eq_ignore_ascii_case("bearer "))
            .map(|v| v[7..].trim().to_string())
            .filter(|t| !t.is_empty());

        if bearer.is_some() {
            return bearer;
        }

        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Decode and validate a session token, returning the claims
    pub fn decode_session(secret: &str, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Resolve the signed-in user id, if any. Invalid or expired tokens count
    /// as signed out.
    pub fn current_user_id(secret: &str, headers: &HeaderMap) -> Option<String> {
        let token = Self::session_token(headers)?;
        match Self::decode_session(secret, &token) {
            Ok(claims) if !claims.sub.is_empty() => Some(claims.sub),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Rejected session token: {:?}", e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::Claims;

    pub const TEST_SECRET: &str = "test-secret";

    /// Sign a session token the way the identity provider would.
    pub fn issue_token(user_id: &str, valid_for: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + valid_for).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn token_for(user_id: &str) -> String {
        issue_token(user_id, Duration::hours(1))
    }
}
