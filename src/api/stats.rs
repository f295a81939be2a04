//! Statistics Endpoints
//! Mission: Aggregate click analytics over a user's short links

use crate::{
    app::AppState,
    auth::models::Principal,
    errors::ApiError,
    messages,
    store::links::LinkRecord,
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::links::LinkRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUrl {
    pub short_url: String,
    pub long_url: String,
    pub clicks: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StatsUrl {
    fn from_record(link: &LinkRecord, now: DateTime<Utc>) -> Self {
        Self {
            short_url: link.short_url.clone(),
            long_url: link.original_url.clone(),
            clicks: link.click_count,
            is_active: link.is_active(now),
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_clicks: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_list: Option<Vec<StatsUrl>>,
}

fn summarize(urls: Vec<StatsUrl>) -> StatisticsResponse {
    let total_clicks = urls.iter().map(|u| u.clicks).sum();
    StatisticsResponse {
        total_clicks,
        url_list: Some(urls),
    }
}

/// GET /api/v1/statistics/all
pub async fn all(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let user = state
        .users
        .find_by_login(&principal.login)?
        .ok_or_else(|| ApiError::Unauthorized(messages::USER_NOT_FOUND.to_string()))?;

    let links = state.links.for_user(user.id)?;
    if links.is_empty() {
        return Err(ApiError::NotFound(messages::NO_URLS_FOUND.to_string()));
    }

    let now = Utc::now();
    Ok(Json(summarize(
        links.iter().map(|l| StatsUrl::from_record(l, now)).collect(),
    )))
}

/// GET /api/v1/statistics/active
pub async fn active(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let user = state
        .users
        .find_by_login(&principal.login)?
        .ok_or_else(|| ApiError::Unauthorized(messages::USER_NOT_FOUND.to_string()))?;

    let links = state.links.for_user(user.id)?;
    if links.is_empty() {
        return Err(ApiError::NotFound(
            messages::NO_ACTIVE_URLS_FOUND.to_string(),
        ));
    }

    let now = Utc::now();
    Ok(Json(summarize(
        links
            .iter()
            .filter(|l| l.is_active(now))
            .map(|l| StatsUrl::from_record(l, now))
            .collect(),
    )))
}

/// POST /api/v1/statistics/clicks — click count for one owned short URL.
///
/// A POST with a body rather than a GET, so the short URL never lands in
/// access logs as a query string.
pub async fn clicks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let user = state
        .users
        .find_by_login(&principal.login)?
        .ok_or_else(|| ApiError::Unauthorized(messages::USER_NOT_FOUND.to_string()))?;

    let link = state
        .links
        .find_by_short(&body.original_url)?
        .ok_or_else(|| ApiError::NotFound(messages::URL_NOT_FOUND.to_string()))?;
    if link.user_id != user.id {
        return Err(ApiError::Forbidden(messages::FOREIGN_LINK.to_string()));
    }

    Ok(Json(StatisticsResponse {
        total_clicks: link.click_count,
        url_list: None,
    }))
}
