//! Authentication Middleware
//! Mission: Establish the caller's identity once per request, then enforce
//! the route access policy

use crate::{
    auth::{
        jwt::{token_from_header, TokenProvider},
        models::Principal,
        policy::{required_access, Denial},
    },
    errors::ApiError,
    messages,
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

/// Request gate. Runs before route dispatch on every request:
/// extracts and validates a bearer token if one is present, attaches the
/// principal to the request extensions, then evaluates the path policy.
///
/// An invalid or missing token never aborts the request here; the request
/// proceeds anonymous and the policy decides between 401 and 403.
///
/// Access tokens are deliberately not checked against the revocation store;
/// revocation is consulted only when a refresh token is presented. A revoked
/// session's access token therefore remains usable until its own 15-minute
/// expiry.
pub async fn auth_gate(
    State(tokens): State<Arc<TokenProvider>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let principal = match token_from_header(header) {
        Some(token) if tokens.validate(token) => {
            match (tokens.subject(token), tokens.role(token)) {
                (Ok(login), Ok(role)) => Some(Principal { login, role }),
                (_, Err(e)) => {
                    warn!("Token carried an unknown role: {}", e);
                    None
                }
                (Err(e), _) => {
                    warn!("Token subject extraction failed: {}", e);
                    None
                }
            }
        }
        Some(_) => None, // validate() already logged the reason
        None => None,
    };

    let role = principal.as_ref().map(|p| p.role);
    if let Err(denial) = required_access(req.uri().path()).check(role) {
        return Err(match denial {
            Denial::Unauthenticated => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            Denial::Forbidden => ApiError::Forbidden("Insufficient permissions".to_string()),
        });
    }

    if let Some(principal) = principal {
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}

/// Extract the principal placed by `auth_gate`. Handlers on gated routes may
/// rely on it being present.
pub fn principal(req: &Request) -> Option<&Principal> {
    req.extensions().get::<Principal>()
}

/// Convenience for handlers that must have a caller.
pub fn require_principal(req: &Request) -> Result<Principal, ApiError> {
    principal(req)
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized(messages::USER_NOT_FOUND.to_string()))
}
