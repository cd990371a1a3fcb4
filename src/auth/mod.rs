use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::error::CatalogError;

/// Cookie the login flow stores the token under
pub const AUTH_COOKIE: &str = "Authorization";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| JwtError::TokenGeneration(format!("expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            sub: user_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;
    Ok(token_data.claims)
}

/// Resolves the calling user from request headers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user_id(&self, headers: &HeaderMap) -> Result<Uuid, CatalogError>;
}

/// HS256 tokens from a Bearer header or the `Authorization` cookie
#[derive(Clone)]
pub struct JwtAuthProvider {
    secret: String,
    expiry_hours: u64,
}

impl JwtAuthProvider {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self { secret: secret.into(), expiry_hours }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.jwt_expiry_hours)
    }

    /// Mint a token for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        generate_jwt(&Claims::new(user_id, self.expiry_hours)?, &self.secret)
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn current_user_id(&self, headers: &HeaderMap) -> Result<Uuid, CatalogError> {
        let token = extract_token(headers).map_err(CatalogError::unauthenticated)?;
        let claims = validate_jwt(&token, &self.secret).map_err(|e| CatalogError::unauthenticated(e.to_string()))?;
        Ok(claims.sub)
    }
}

/// Bearer header first, then the auth cookie
fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| "Authorization header must use Bearer token format".to_string())?;
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        return Ok(token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == AUTH_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| "Authentication token missing".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    #[tokio::test]
    async fn bearer_token_round_trips() {
        let provider = JwtAuthProvider::new(SECRET, 1);
        let user = Uuid::new_v4();
        let token = provider.issue(user).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
        assert_eq!(provider.current_user_id(&headers).await.unwrap(), user);
    }

    #[tokio::test]
    async fn cookie_token_is_accepted() {
        let provider = JwtAuthProvider::new(SECRET, 1);
        let user = Uuid::new_v4();
        let token = provider.issue(user).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&format!("theme=dark; Authorization={}", token)).unwrap());
        assert_eq!(provider.current_user_id(&headers).await.unwrap(), user);
    }

    #[tokio::test]
    async fn missing_or_foreign_tokens_are_rejected() {
        let provider = JwtAuthProvider::new(SECRET, 1);
        assert!(matches!(
            provider.current_user_id(&HeaderMap::new()).await,
            Err(CatalogError::Unauthenticated(_))
        ));

        let foreign = JwtAuthProvider::new("other-secret", 1).issue(Uuid::new_v4()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", foreign)).unwrap());
        assert!(provider.current_user_id(&headers).await.is_err());
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let claims = Claims::new(Uuid::new_v4(), 1).unwrap();
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn huge_expiry_fails_instead_of_overflowing() {
        let provider = JwtAuthProvider::new(SECRET, u64::MAX);
        assert!(matches!(provider.issue(Uuid::new_v4()), Err(JwtError::TokenGeneration(_))));

        let provider = JwtAuthProvider::new(SECRET, i64::MAX as u64 / 2);
        assert!(matches!(provider.issue(Uuid::new_v4()), Err(JwtError::TokenGeneration(_))));
    }
}
