//! Application Assembly
//! Mission: Shared state and the fully-wired router

use crate::{
    api,
    auth::{self, jwt::TokenProvider, middleware::auth_gate},
    errors::ApiError,
    middleware::request_logging,
    store::{ActivityLog, BlacklistStore, Db, LinkStore, NoteStore, UserStore},
};
use axum::{
    extract::Request,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Everything a handler can reach. Cloned per request; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub links: LinkStore,
    pub notes: NoteStore,
    pub blacklist: BlacklistStore,
    pub activity: ActivityLog,
    pub tokens: Arc<TokenProvider>,
}

impl AppState {
    pub fn new(db: Db, tokens: Arc<TokenProvider>) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            links: LinkStore::new(db.clone()),
            notes: NoteStore::new(db.clone()),
            blacklist: BlacklistStore::new(db.clone()),
            activity: ActivityLog::new(db),
            tokens,
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Unmatched paths still pass the auth gate first; anything under /api/v2
/// answers with the version placeholder, the rest is a plain 404.
async fn fallback(req: Request) -> axum::response::Response {
    if req.uri().path().starts_with("/api/v2") {
        return api::users::v2_placeholder().await.into_response();
    }
    ApiError::NotFound("The requested resource was not found.".to_string()).into_response()
}

/// Build the complete application router. The auth gate wraps every route
/// (and the fallback), so the path policy is enforced even for URLs no
/// route matches.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Authentication lifecycle
        .route("/api/v1/user/signup", post(auth::handlers::signup))
        .route(
            "/api/v1/user/register-admin",
            post(auth::handlers::register_admin),
        )
        .route("/api/v1/user/signin", post(auth::handlers::signin))
        .route("/api/v1/user/refresh", post(auth::handlers::refresh))
        .route("/api/v1/user/logout", post(auth::handlers::logout))
        // Role-tier endpoints
        .route("/api/v1/user/test", get(api::users::user_test))
        .route("/api/v1/moderator/test", get(api::users::moderator_test))
        .route("/api/v1/manager/test", get(api::users::manager_test))
        .route("/api/v1/admin/test", get(api::users::admin_test))
        .route(
            "/api/v1/admin/blacklisted-tokens",
            get(api::users::blacklisted_tokens),
        )
        // Short links
        .route("/api/v1/link/shorten", post(api::links::shorten))
        .route("/api/v1/link/expand", post(api::links::expand))
        .route("/api/v1/link/modify", post(api::links::modify))
        .route("/api/v1/link/remove", post(api::links::remove))
        .route("/api/v1/link/all", get(api::links::all))
        .route("/api/v1/link/filter", get(api::links::filter))
        .route("/api/v1/link/stats", post(api::links::stats))
        // Notes
        .route(
            "/api/v1/notes",
            post(api::notes::create).get(api::notes::list),
        )
        .route(
            "/api/v1/notes/:id",
            get(api::notes::get)
                .patch(api::notes::update)
                .delete(api::notes::delete),
        )
        // Statistics
        .route("/api/v1/statistics/all", get(api::stats::all))
        .route("/api/v1/statistics/active", get(api::stats::active))
        .route("/api/v1/statistics/clicks", post(api::stats::clicks))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_gate,
        ))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
