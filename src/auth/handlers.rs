//! Authentication Endpoints
//! Mission: Signup, signin, token refresh with rotation, and logout

use crate::{
    app::AppState,
    auth::{
        models::{
            AuthResponse, CredentialsRequest, LogoutRequest, RefreshRequest, RegistrationResponse,
            Role,
        },
        validator::validate_credentials,
    },
    errors::ApiError,
    messages,
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

/// POST /api/v1/user/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    register(state, body, Role::User).await
}

/// POST /api/v1/user/register-admin
///
/// Same flow as signup with the ADMIN role attached. Kept public for
/// initial bootstrap of a fresh deployment.
pub async fn register_admin(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    register(state, body, Role::Admin).await
}

async fn register(
    state: AppState,
    body: CredentialsRequest,
    role: Role,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    if body.login.trim().is_empty() || body.password.trim().is_empty() {
        return Err(ApiError::BadRequest(
            messages::CREDENTIALS_REQUIRED.to_string(),
        ));
    }
    validate_credentials(&body.login, &body.password)?;

    // Logins are stored lowercase; lookups stay case-insensitive.
    let login = body.login.trim().to_lowercase();
    if state.users.exists(&login)? {
        return Err(ApiError::Conflict(messages::USER_ALREADY_EXISTS.to_string()));
    }

    let user = state.users.create(&login, &body.password, role)?;
    state.activity.record(&user.login, "Registered");

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: messages::REGISTRATION_SUCCESSFUL.to_string(),
            user_id: user.id,
            login: user.login,
        }),
    ))
}

/// POST /api/v1/user/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .find_by_login(&body.login)?
        .ok_or_else(|| ApiError::Unauthorized(messages::USER_NOT_FOUND.to_string()))?;

    if !state.users.password_matches(&user, &body.password)? {
        return Err(ApiError::Unauthorized(
            messages::INVALID_PASSWORD.to_string(),
        ));
    }

    let access_token = state.tokens.issue_access(&user.login, user.role)?;
    let refresh_token = state.tokens.issue_refresh(&user.login, user.role)?;

    state.activity.record(&user.login, "Logged in");
    info!("User signed in: {}", user.login);

    Ok(Json(AuthResponse {
        message: messages::AUTH_SUCCESSFUL.to_string(),
        access_token,
        refresh_token,
    }))
}

/// POST /api/v1/user/refresh
///
/// Rotation: a refresh token is single-use. The presented token is checked
/// against the blacklist before any cryptographic validation, then a fresh
/// pair is issued and the old token is blacklisted for its remaining life.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let presented = &body.refresh_token;

    if state.blacklist.is_blacklisted(presented)? {
        return Err(ApiError::Unauthorized(
            messages::TOKEN_LOGGED_OUT.to_string(),
        ));
    }
    if !state.tokens.validate(presented) {
        return Err(ApiError::Unauthorized(messages::TOKEN_INVALID.to_string()));
    }

    let login = state.tokens.subject(presented)?;
    let role = state.tokens.role(presented)?;

    let access_token = state.tokens.issue_access(&login, role)?;
    let refresh_token = state.tokens.issue_refresh(&login, role)?;

    state
        .blacklist
        .blacklist(presented, state.tokens.remaining_ttl(presented))?;
    state.activity.record(&login, "Refreshed token");

    Ok(Json(AuthResponse {
        message: messages::AUTH_SUCCESSFUL.to_string(),
        access_token,
        refresh_token,
    }))
}

/// POST /api/v1/user/logout
///
/// Blacklists the refresh token regardless of its validity; logging out
/// with a garbage token still answers 200 once the body is present.
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = match body.refresh_token.as_deref() {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            return Err(ApiError::BadRequest(
                messages::REFRESH_TOKEN_MISSING.to_string(),
            ))
        }
    };

    state
        .blacklist
        .blacklist(token, state.tokens.remaining_ttl(token))?;

    if let Ok(login) = state.tokens.subject(token) {
        state.activity.record(&login, "Logged out");
        info!("User logged out: {}", login);
    }

    Ok(Json(json!({ "message": messages::LOGOUT_SUCCESSFUL })))
}
