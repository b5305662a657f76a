//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the user's UUID. Handlers take
//! `AuthUser` as an extractor; a missing or invalid token rejects with 401.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                debug!("Rejected bearer token: {e}");
                AppError::Unauthorized
            })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user_id = state.jwt.verify(token)?;
        Ok(AuthUser { user_id })
    }
}

/// Signs a token for `user_id`, valid for `ttl_secs`.
#[cfg(test)]
pub fn issue_token(secret: &str, user_id: Uuid, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let exp = (chrono::Utc::now().timestamp() + ttl_secs) as usize;
    encode(
        &Header::new(Algorithm::HS256),
        &Claims { sub: user_id, exp },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_valid_token_yields_subject() {
        let user = Uuid::new_v4();
        let token = issue_token(SECRET, user, 3600);
        assert_eq!(JwtVerifier::new(SECRET).verify(&token).unwrap(), user);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = issue_token("other-secret", Uuid::new_v4(), 3600);
        assert!(matches!(
            JwtVerifier::new(SECRET).verify(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let token = issue_token(SECRET, Uuid::new_v4(), -3600);
        assert!(JwtVerifier::new(SECRET).verify(&token).is_err());
    }

    #[test]
    fn test_bearer_prefix_required() {
        let (mut parts, _) = axum::http::Request::builder()
            .header(AUTHORIZATION, "Token abc")
            .body(())
            .unwrap()
            .into_parts();
        assert!(bearer_token(&parts).is_none());

        parts
            .headers
            .insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&parts), Some("abc"));
    }
}
