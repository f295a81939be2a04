//! Route Access Policy
//! Mission: One static table deciding which roles may reach which paths

use crate::auth::models::Role;

/// Access requirement for a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a principal.
    Public,
    /// Principal required, role must be one of the listed set.
    Roles(&'static [Role]),
    /// Principal required, any role.
    Authenticated,
}

const USER_TIER: &[Role] = &[Role::User, Role::Moderator, Role::Manager, Role::Admin];
const MODERATOR_TIER: &[Role] = &[Role::Moderator, Role::Admin];
const MANAGER_TIER: &[Role] = &[Role::Manager, Role::Admin];
const ADMIN_TIER: &[Role] = &[Role::Admin];

/// Auth endpoints stay public so signin/refresh/logout work without a token.
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/v1/user/signup",
    "/api/v1/user/signin",
    "/api/v1/user/refresh",
    "/api/v1/user/logout",
    "/api/v1/user/register-admin",
];

/// Resolve the access requirement for a path. Most specific rule wins:
/// exact public paths, then role tiers by prefix, then the authenticated
/// catch-all.
pub fn required_access(path: &str) -> Access {
    if PUBLIC_PATHS.contains(&path) {
        return Access::Public;
    }

    if path.starts_with("/api/v1/admin") {
        Access::Roles(ADMIN_TIER)
    } else if path.starts_with("/api/v1/manager") {
        Access::Roles(MANAGER_TIER)
    } else if path.starts_with("/api/v1/moderator") {
        Access::Roles(MODERATOR_TIER)
    } else if path.starts_with("/api/v1/user") {
        Access::Roles(USER_TIER)
    } else {
        Access::Authenticated
    }
}

impl Access {
    /// Check a (possibly absent) principal role against this requirement.
    /// `Ok(())` means proceed; the error says whether 401 or 403 applies.
    pub fn check(&self, role: Option<Role>) -> Result<(), Denial> {
        match self {
            Access::Public => Ok(()),
            Access::Authenticated => role.map(|_| ()).ok_or(Denial::Unauthenticated),
            Access::Roles(allowed) => match role {
                None => Err(Denial::Unauthenticated),
                Some(r) if allowed.contains(&r) => Ok(()),
                Some(_) => Err(Denial::Forbidden),
            },
        }
    }
}

/// Why a request was denied: no principal at all, or wrong role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}
