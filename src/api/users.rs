//! Role-Tier and Admin Endpoints
//! Mission: Per-tier smoke endpoints plus the admin revocation listing

use crate::{
    app::AppState,
    auth::models::Principal,
    errors::ApiError,
    messages,
    store::blacklist::BlacklistedToken,
};
use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

/// GET /api/v1/user/test — greeting for any authenticated role.
pub async fn user_test(Extension(principal): Extension<Principal>) -> Json<Value> {
    Json(json!({
        "message": format!("Hello, {}", principal.login),
        "role": principal.role.as_str(),
    }))
}

/// GET /api/v1/moderator/test
pub async fn moderator_test() -> Json<Value> {
    Json(json!({ "message": "Access granted for MODERATOR" }))
}

/// GET /api/v1/manager/test
pub async fn manager_test() -> Json<Value> {
    Json(json!({ "message": "Access granted for MANAGER" }))
}

/// GET /api/v1/admin/test
pub async fn admin_test(Extension(principal): Extension<Principal>) -> Json<Value> {
    Json(json!({
        "message": format!("Hello, admin {}", principal.login),
        "role": principal.role.as_str(),
    }))
}

/// GET /api/v1/admin/blacklisted-tokens — every live revocation record.
pub async fn blacklisted_tokens(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlacklistedToken>>, ApiError> {
    Ok(Json(state.blacklist.list_all()?))
}

/// Any /api/v2 request lands here until version 2 ships.
pub async fn v2_placeholder() -> Json<Value> {
    Json(json!({ "message": messages::V2_UNDER_DEVELOPMENT }))
}
