use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::access::{Actor, Profile, Role};
use crate::config;

/// Bearer token payload. The role and investor flag are trusted as issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    #[serde(default)]
    pub is_investor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, role: Role, is_investor: bool, name: Option<String>) -> Self {
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self::with_expiry(sub, role, is_investor, name, expiry_hours as i64)
    }

    pub fn with_expiry(sub: Uuid, role: Role, is_investor: bool, name: Option<String>, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub,
            role,
            is_investor,
            name,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn for_actor(actor: &Actor) -> Self {
        Self::new(
            actor.id,
            actor.role,
            actor.profile.is_investor,
            actor.profile.display_name.clone(),
        )
    }

    pub fn into_actor(self) -> Actor {
        Actor::new(self.sub, self.role).with_profile(Profile {
            is_investor: self.is_investor,
            display_name: self.name,
            hourly_rate: None,
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    generate_jwt_with(claims, secret()?)
}

pub fn generate_jwt_with(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    validate_jwt_with(token, secret()?)
}

pub fn validate_jwt_with(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;
    Ok(token_data.claims)
}
