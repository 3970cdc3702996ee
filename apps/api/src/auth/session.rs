//! Session issuance.
//!
//! A successful login mints a signed, stateless refresh token delivered as an
//! HTTP-only cookie. The JWT `exp` claim and the cookie max-age both cover 24
//! hours; the server keeps no session-side state, so there is no revocation.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// Token and cookie lifetime, one source of truth for both.
pub const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Account id.
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Mints a signed refresh token for the account.
pub fn mint_refresh_token(
    user_id: Uuid,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let claims = RefreshClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: now.timestamp() + SESSION_TTL_SECONDS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign refresh token: {e}")))
}

/// Builds the session cookie: HttpOnly, SameSite=Strict, Secure in
/// production, max-age matching the token's validity.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(SESSION_TTL_SECONDS))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{decode, errors::Error, DecodingKey, Validation};

    const SECRET: &str = "test-secret";

    /// The server never decodes refresh tokens (stateless model, cookie
    /// presence checked at the edge); decoding here verifies what we sign.
    fn decode_claims(token: &str, secret: &str) -> Result<RefreshClaims, Error> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }

    #[test]
    fn minted_token_roundtrips() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let token = mint_refresh_token(user_id, SECRET, now).unwrap();
        let claims = decode_claims(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECONDS);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_refresh_token(Uuid::new_v4(), SECRET, Utc::now()).unwrap();
        assert!(decode_claims(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let token = mint_refresh_token(Uuid::new_v4(), SECRET, issued).unwrap();
        assert!(decode_claims(&token, SECRET).is_err());
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), true);
        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_TTL_SECONDS))
        );
    }
}
