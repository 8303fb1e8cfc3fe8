//! HS256 session tokens issued by the hosted identity provider.
//!
//! The provider signs a token per session; `sub` is the provider's user id
//! and the remaining claims carry the profile (email, names, avatar).

use async_trait::async_trait;
use chrono::{Duration, Utc};
use domains::{DomainError, ExternalIdentity, IdentityProvider, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::debug;

pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &[u8], issuer: Option<&str>, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_aud = false;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self { key: DecodingKey::from_secret(secret), validation }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "rejected identity token");
            DomainError::NotAuthenticated
        })?;

        let mut claims = data.claims;
        let external_id = match claims.remove("sub") {
            Some(Value::String(sub)) if !sub.trim().is_empty() => sub,
            _ => return Err(DomainError::NotAuthenticated),
        };

        Ok(ExternalIdentity { external_id, claims: Value::Object(claims) })
    }
}

/// Signs a token the way the identity provider does. Used by the seed tool
/// and tests.
pub fn mint_token(secret: &[u8], subject: &str, profile: Value, ttl: Duration) -> Result<String> {
    let mut claims = match profile {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return Err(DomainError::validation(format!("profile claims must be an object, got {other}"))),
    };
    claims.insert("sub".into(), Value::String(subject.to_string()));
    claims.insert("iat".into(), Value::from(Utc::now().timestamp()));
    claims.insert("exp".into(), Value::from((Utc::now() + ttl).timestamp()));

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
        .map_err(|err| DomainError::Internal(format!("failed to sign token: {err}")))
}
