//! JWT Token Provider
//! Mission: Issue and verify access/refresh tokens with one shared key

use crate::auth::models::{Claims, Role};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tracing::warn;

/// Access tokens live 15 minutes, refresh tokens 7 days.
const ACCESS_TTL_SECS: i64 = 15 * 60;
const REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Issues and verifies HS256 tokens. The key is decoded once from a
/// base64-encoded secret at startup and never mutated afterwards.
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenProvider {
    /// Build a provider from the base64-encoded signing secret.
    /// A missing or malformed secret must abort startup, so this is fallible
    /// exactly once, in `main`.
    pub fn from_base64_secret(secret: &str) -> Result<Self> {
        let key_bytes = BASE64
            .decode(secret.trim())
            .context("JWT secret is not valid base64")?;
        anyhow::ensure!(!key_bytes.is_empty(), "JWT secret decodes to zero bytes");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key_bytes),
            decoding_key: DecodingKey::from_secret(&key_bytes),
            access_ttl_secs: ACCESS_TTL_SECS,
            refresh_ttl_secs: REFRESH_TTL_SECS,
        })
    }

    /// Test hook: same key handling, custom validity windows.
    #[cfg(test)]
    pub fn with_ttls(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Result<Self> {
        let mut provider = Self::from_base64_secret(secret)?;
        provider.access_ttl_secs = access_ttl_secs;
        provider.refresh_ttl_secs = refresh_ttl_secs;
        Ok(provider)
    }

    /// Generate a short-lived access token for an authenticated identity.
    pub fn issue_access(&self, login: &str, role: Role) -> Result<String> {
        self.issue(login, role, self.access_ttl_secs)
    }

    /// Generate a long-lived refresh token.
    pub fn issue_refresh(&self, login: &str, role: Role) -> Result<String> {
        self.issue(login, role, self.refresh_ttl_secs)
    }

    fn issue(&self, login: &str, role: Role, ttl_secs: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: login.to_string(),
            role: role.as_str().to_string(),
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign token")
    }

    /// True iff the token is well-formed, the signature verifies, and the
    /// expiry has not passed. Every failure mode collapses to `false`; the
    /// reason is logged at warn level and never surfaced to the client.
    pub fn validate(&self, token: &str) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(_) => true,
            Err(e) => {
                warn!("Invalid JWT token: {}", e);
                false
            }
        }
    }

    /// Extract the subject (login). Only meaningful after `validate`.
    pub fn subject(&self, token: &str) -> Result<String> {
        Ok(self.decode_claims(token)?.sub)
    }

    /// Extract the role. Errors if the stored name is not a known role.
    pub fn role(&self, token: &str) -> Result<Role> {
        let claims = self.decode_claims(token)?;
        Role::from_str(&claims.role)
            .with_context(|| format!("Unknown role in token: {}", claims.role))
    }

    /// Remaining validity (`exp - now`), or zero if the token cannot be
    /// parsed or has already expired. Sizes the revocation record so it is
    /// not retained past the token's own life.
    pub fn remaining_ttl(&self, token: &str) -> Duration {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => {
                let secs = data.claims.exp - Utc::now().timestamp();
                if secs > 0 {
                    Duration::from_secs(secs as u64)
                } else {
                    Duration::ZERO
                }
            }
            Err(e) => {
                warn!("Could not read token expiry: {}", e);
                Duration::ZERO
            }
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Failed to decode token claims")?;
        Ok(data.claims)
    }
}

/// Pull the raw token out of an `Authorization` header value.
/// Recognizes exactly the prefix `"Bearer "` (case-sensitive, single space);
/// any other shape means "no token present". `"Bearer "` alone yields an
/// empty token, which then fails validation.
pub fn token_from_header(header: Option<&str>) -> Option<&str> {
    header.and_then(|h| h.strip_prefix("Bearer "))
}
