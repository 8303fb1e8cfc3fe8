//! # Identity normalization
//!
//! Identity providers hand over loosely shaped claim payloads. Everything
//! past the sync boundary works with the fixed [`IdentityProfile`].

use serde_json::Value;

use crate::error::{DomainError, Result};

/// A verified identity as returned by an [`crate::IdentityProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub external_id: String,
    /// Raw profile claims, shape decided by the provider
    pub claims: Value,
}

/// Provider profile after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub external_id: String,
    pub email: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl IdentityProfile {
    /// Accepts both snake_case and camelCase claim names, plus the nested
    /// `email_addresses: [{ email_address }]` form.
    pub fn from_identity(identity: &ExternalIdentity) -> Result<Self> {
        let external_id = identity.external_id.trim();
        if external_id.is_empty() {
            return Err(DomainError::validation("identity has no subject"));
        }
        let claims = &identity.claims;

        let email = claim(claims, &["email", "email_address", "emailAddress"])
            .or_else(|| nested_email(claims))
            .ok_or_else(|| DomainError::validation("identity has no email address"))?;
        if email_local_part(&email).is_none() {
            return Err(DomainError::validation(format!("malformed email address {email}")));
        }

        let first = claim(claims, &["first_name", "firstName", "given_name"]);
        let last = claim(claims, &["last_name", "lastName", "family_name"]);
        let name = match (first, last) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(one), None) | (None, Some(one)) => Some(one),
            (None, None) => claim(claims, &["name"]),
        };

        Ok(Self {
            external_id: external_id.to_string(),
            email,
            username: claim(claims, &["username", "preferred_username"]).map(|u| sanitize_username(&u)).filter(|u| !u.is_empty()),
            name,
            image: claim(claims, &["image_url", "imageUrl", "picture"]),
        })
    }

    /// Usernames to try, in order. The provider's username comes first, then
    /// the email local part. Callers append a random suffix once these are
    /// exhausted.
    pub fn username_candidates(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(2);
        if let Some(u) = &self.username {
            out.push(u.clone());
        }
        if let Some(local) = email_local_part(&self.email).map(sanitize_username) {
            if !local.is_empty() && !out.contains(&local) {
                out.push(local);
            }
        }
        out
    }

    /// Base used for suffixed fallback usernames.
    pub fn username_base(&self) -> String {
        email_local_part(&self.email)
            .map(sanitize_username)
            .filter(|s| !s.is_empty())
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| "user".to_string())
    }
}

fn claim(claims: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| claims.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn nested_email(claims: &Value) -> Option<String> {
    ["email_addresses", "emailAddresses"]
        .iter()
        .filter_map(|k| claims.get(*k)?.as_array()?.first())
        .find_map(|entry| claim(entry, &["email_address", "emailAddress"]))
}

pub fn email_local_part(email: &str) -> Option<&str> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(local),
        _ => None,
    }
}

fn sanitize_username(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}
