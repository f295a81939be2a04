//! Link Endpoints
//! Mission: Shorten, expand, modify, remove, list, and filter short URLs

use crate::{
    app::AppState,
    auth::models::Principal,
    errors::ApiError,
    messages,
    store::{links::LinkRecord, users::UserRecord},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

const SHORT_LINK_SYMBOLS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SHORT_LINK_MIN_LENGTH: usize = 6;
const SHORT_LINK_MAX_LENGTH: usize = 8;

/// Random 6-8 character alphanumeric code, served under https.
fn generate_short_link() -> String {
    let mut rng = rand::thread_rng();
    let length = rng.gen_range(SHORT_LINK_MIN_LENGTH..=SHORT_LINK_MAX_LENGTH);
    let code: String = (0..length)
        .map(|_| SHORT_LINK_SYMBOLS[rng.gen_range(0..SHORT_LINK_SYMBOLS.len())] as char)
        .collect();
    format!("https://{}", code)
}

fn url_valid(url: &str) -> bool {
    url.starts_with("http")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub original_url: String,
    #[serde(default)]
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Success body for link operations. Absent fields are left out of the JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub status_message: String,
    pub success: bool,
}

impl LinkResponse {
    fn from_record(link: &LinkRecord, created_by: &str, message: &str) -> Self {
        Self {
            short_link: Some(link.short_url.clone()),
            full_url: Some(link.original_url.clone()),
            created_on: Some(link.created_at),
            expires_on: link.expires_at,
            created_by: Some(created_by.to_string()),
            status_message: message.to_string(),
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatsResponse {
    pub short_link: String,
    pub full_url: String,
    pub created_on: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<DateTime<Utc>>,
    pub click_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    #[serde(default = "default_filter")]
    pub r#type: String,
}

fn default_filter() -> String {
    "active".to_string()
}

/// Resolve the calling principal to its user row.
fn caller(state: &AppState, principal: &Principal) -> Result<UserRecord, ApiError> {
    state
        .users
        .find_by_login(&principal.login)?
        .ok_or_else(|| ApiError::Unauthorized(messages::USER_NOT_FOUND.to_string()))
}

/// Look up a short link and enforce ownership. Foreign links answer 403
/// without confirming anything else about them.
fn owned_link(
    state: &AppState,
    user: &UserRecord,
    short_url: &str,
) -> Result<LinkRecord, ApiError> {
    let link = state
        .links
        .find_by_short(short_url)?
        .ok_or_else(|| ApiError::NotFound(messages::URL_NOT_FOUND.to_string()))?;
    if link.user_id != user.id {
        return Err(ApiError::Forbidden(messages::FOREIGN_LINK.to_string()));
    }
    Ok(link)
}

/// POST /api/v1/link/shorten
pub async fn shorten(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), ApiError> {
    let user = caller(&state, &principal)?;

    if !url_valid(&body.original_url) {
        return Err(ApiError::BadRequest(messages::INVALID_URL.to_string()));
    }
    if let Some(expiry) = body.expiration_time {
        if expiry <= Utc::now() {
            return Err(ApiError::BadRequest(
                messages::INVALID_EXPIRATION_DATE.to_string(),
            ));
        }
    }

    // Retry on the off chance the random code collides with an existing row.
    let mut short_url = generate_short_link();
    while state.links.find_by_short(&short_url)?.is_some() {
        short_url = generate_short_link();
    }

    let link = state
        .links
        .insert(&body.original_url, &short_url, body.expiration_time, user.id)?;

    info!("Short link created: {} -> {}", link.short_url, link.original_url);

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_record(
            &link,
            &user.login,
            messages::URL_CREATED,
        )),
    ))
}

/// POST /api/v1/link/expand
///
/// Resolves a short link back to its original URL and counts the click.
/// Expired links answer 410 and do not count.
pub async fn expand(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, ApiError> {
    let user = caller(&state, &principal)?;
    let link = owned_link(&state, &user, &body.original_url)?;

    if !link.is_active(Utc::now()) {
        return Err(ApiError::Gone(messages::EXPIRED_URL.to_string()));
    }

    state.links.increment_clicks(link.id)?;

    Ok(Json(LinkResponse::from_record(
        &link,
        &user.login,
        messages::LINK_FOUND,
    )))
}

/// POST /api/v1/link/modify — updates the expiry of an owned link.
pub async fn modify(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, ApiError> {
    let user = caller(&state, &principal)?;
    let link = owned_link(&state, &user, &body.original_url)?;

    if let Some(expiry) = body.expiration_time {
        if expiry <= Utc::now() {
            return Err(ApiError::BadRequest(
                messages::INVALID_EXPIRATION_DATE.to_string(),
            ));
        }
    }

    state.links.update_expiry(link.id, body.expiration_time)?;
    let link = owned_link(&state, &user, &body.original_url)?;

    Ok(Json(LinkResponse::from_record(
        &link,
        &user.login,
        messages::URL_UPDATED,
    )))
}

/// POST /api/v1/link/remove
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, ApiError> {
    let user = caller(&state, &principal)?;
    let link = owned_link(&state, &user, &body.original_url)?;

    state.links.delete(link.id)?;
    info!("Short link removed: {}", link.short_url);

    Ok(Json(LinkResponse {
        short_link: Some(link.short_url),
        full_url: None,
        created_on: None,
        expires_on: None,
        created_by: Some(user.login),
        status_message: messages::URL_DELETED.to_string(),
        success: true,
    }))
}

/// GET /api/v1/link/all
pub async fn all(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<LinkResponse>>, ApiError> {
    let user = caller(&state, &principal)?;
    let links = state.links.for_user(user.id)?;

    Ok(Json(
        links
            .iter()
            .map(|l| LinkResponse::from_record(l, &user.login, messages::LINK_FOUND))
            .collect(),
    ))
}

/// GET /api/v1/link/filter?type=active|expired
pub async fn filter(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<LinkResponse>>, ApiError> {
    let user = caller(&state, &principal)?;
    let now = Utc::now();

    let keep_active = match params.r#type.as_str() {
        "active" => true,
        "expired" => false,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown filter type: {}",
                other
            )))
        }
    };

    let links = state.links.for_user(user.id)?;
    Ok(Json(
        links
            .iter()
            .filter(|l| l.is_active(now) == keep_active)
            .map(|l| LinkResponse::from_record(l, &user.login, messages::LINK_FOUND))
            .collect(),
    ))
}

/// POST /api/v1/link/stats — click count and timestamps for one owned link.
pub async fn stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<LinkStatsResponse>, ApiError> {
    let user = caller(&state, &principal)?;
    let link = owned_link(&state, &user, &body.original_url)?;

    Ok(Json(LinkStatsResponse {
        short_link: link.short_url,
        full_url: link.original_url,
        created_on: link.created_at,
        expires_on: link.expires_at,
        click_count: link.click_count,
    }))
}
