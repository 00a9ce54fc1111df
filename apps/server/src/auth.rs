//! Bearer-token authentication and role checks
//!
//! Tokens are JWTs signed either with a shared HS256 secret or with an RSA key
//! (RS256, e.g. a Keycloak realm key). Roles are collected from
//! `realm_access.roles` and from a top-level `roles` array.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::{config::AuthConfig, Error, Result};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: Option<String>,
    pub username: Option<String>,
    pub roles: Vec<String>,
}

impl Principal {
    /// Case-insensitive match, with or without a `ROLE_` prefix on either side.
    pub fn has_role(&self, role: &str) -> bool {
        let wanted = strip_role_prefix(role);
        self.roles
            .iter()
            .any(|r| strip_role_prefix(r).eq_ignore_ascii_case(wanted))
    }
}

fn strip_role_prefix(role: &str) -> &str {
    match role.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ROLE_") => &role[5..],
        _ => role,
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    preferred_username: Option<String>,
    #[serde(default)]
    realm_access: Option<RealmAccess>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    fn new(key: DecodingKey, algorithm: Algorithm, config: &AuthConfig) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = config.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }
        match config.audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        Self { key, validation }
    }
}

pub struct AuthManager {
    enabled: bool,
    required_role: String,
    hs256: Option<TokenVerifier>,
    rs256: Option<TokenVerifier>,
}

impl AuthManager {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let hs256 = config
            .hs256_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|secret| {
                TokenVerifier::new(
                    DecodingKey::from_secret(secret.as_bytes()),
                    Algorithm::HS256,
                    config,
                )
            });

        let rs256 = match config.rsa_public_key_pem.as_deref().filter(|s| !s.is_empty()) {
            Some(pem) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    Error::Internal(format!("Invalid auth.rsa_public_key_pem: {e}"))
                })?;
                Some(TokenVerifier::new(key, Algorithm::RS256, config))
            }
            None => None,
        };

        if !config.enabled {
            tracing::warn!("Authentication is disabled; patient endpoints are open");
        }

        Ok(Self {
            enabled: config.enabled,
            required_role: config.required_role.clone(),
            hs256,
            rs256,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Verify the bearer token in `headers`. Any failure is `Unauthenticated`.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal> {
        let token = bearer_token(headers).ok_or(Error::Unauthenticated)?;

        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Malformed bearer token");
            Error::Unauthenticated
        })?;

        let verifier = match header.alg {
            Algorithm::HS256 => self.hs256.as_ref(),
            Algorithm::RS256 => self.rs256.as_ref(),
            _ => None,
        }
        .ok_or_else(|| {
            tracing::debug!(alg = ?header.alg, "No verification key for token algorithm");
            Error::Unauthenticated
        })?;

        let data = decode::<Claims>(token, &verifier.key, &verifier.validation).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            Error::Unauthenticated
        })?;

        let claims = data.claims;
        let mut roles = claims.realm_access.map(|r| r.roles).unwrap_or_default();
        roles.extend(claims.roles);

        Ok(Principal {
            subject: claims.sub,
            username: claims.preferred_username,
            roles,
        })
    }

    /// `Forbidden` unless the principal holds the configured role.
    pub fn authorize(&self, principal: &Principal) -> Result<()> {
        if principal.has_role(&self.required_role) {
            Ok(())
        } else {
            tracing::debug!(
                subject = ?principal.subject,
                required_role = %self.required_role,
                "Principal lacks required role"
            );
            Err(Error::Forbidden)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
