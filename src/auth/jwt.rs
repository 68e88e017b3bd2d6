use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,    // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_seconds,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs(ttl_seconds.max(0) as u64),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: i64) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Fails closed: any tampering, expiry (no leeway) or malformed
    /// structure is an error, never partial claims.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// A still-valid token buys a fresh expiry window for the same user.
    /// The old token keeps expiring naturally; callers discard it.
    pub fn refresh(&self, token: &str) -> anyhow::Result<(String, Claims)> {
        let claims = self.verify(token)?;
        let new_token = self.sign(claims.sub)?;
        Ok((new_token, claims))
    }
}

/// Extracts and validates the bearer token, yielding the caller's user id.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;
        let keys = JwtKeys::from_ref(state);
        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

/// Raw bearer token, for endpoints that re-mint the presented credential.
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(|t| BearerToken(t.to_string()))
            .ok_or(ApiError::Unauthenticated)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRef;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn decode_unverified_exp(keys: &JwtKeys, token: &str) -> usize {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_audience(std::slice::from_ref(&keys.audience));
        validation.set_issuer(std::slice::from_ref(&keys.issuer));
        decode::<Claims>(token, &keys.decoding, &validation)
            .expect("decode")
            .claims
            .exp
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.sign(42).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[tokio::test]
    async fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign(1).expect("sign");
        // Flip a character inside the signed payload
        let mid = token.len() / 2;
        let replacement = if token.as_bytes()[mid] == b'A' { "B" } else { "A" };
        token.replace_range(mid..mid + 1, replacement);
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: 7,
            iat: now - 7200,
            exp: now - 3600,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_malformed_token() {
        let keys = make_keys();
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }

    #[tokio::test]
    async fn refresh_of_expired_token_fails() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: 7,
            iat: now - 7200,
            exp: now - 10,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.refresh(&token).is_err());
    }

    #[tokio::test]
    async fn refresh_yields_strictly_later_expiry() {
        let keys = make_keys();
        let token = keys.sign(9).expect("sign");
        let old_exp = decode_unverified_exp(&keys, &token);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let (refreshed, old_claims) = keys.refresh(&token).expect("refresh");
        assert_eq!(old_claims.sub, 9);
        let new_claims = keys.verify(&refreshed).expect("verify refreshed");
        assert_eq!(new_claims.sub, 9);
        assert!(new_claims.exp > old_exp);
    }
}
