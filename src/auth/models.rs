//! Authentication Models
//! Mission: Define user, role, claim, and auth DTO structures

use serde::{Deserialize, Serialize};

/// User roles for RBAC.
///
/// MANAGER exists so the `/api/v1/manager` tier is reachable; the other
/// three map to the standard user/moderator/admin split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "MODERATOR")]
    Moderator,
    #[serde(rename = "MANAGER")]
    Manager,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Moderator => "MODERATOR",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Role::User),
            "MODERATOR" => Some(Role::Moderator),
            "MANAGER" => Some(Role::Manager),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// JWT claims payload. Identical shape for access and refresh tokens;
/// only the expiry window differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's login.
    pub sub: String,
    /// Role name as stored in the users table.
    pub role: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Authenticated identity attached to a request after token verification.
/// Read-only for the remainder of the request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub login: String,
    pub role: Role,
}

/// Signup / signin request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

/// Signin / refresh response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Signup / register-admin response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub message: String,
    pub user_id: i64,
    pub login: String,
}

/// Refresh request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}
