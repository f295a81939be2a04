//! Note Endpoints
//! Mission: Owner-scoped CRUD over personal notes

use crate::{
    app::AppState,
    auth::models::Principal,
    errors::ApiError,
    messages,
    store::notes::NoteRecord,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

const TITLE_MAX_LENGTH: usize = 255;
const CONTENT_MAX_LENGTH: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Envelope for note responses: a status message plus the payload, when
/// there is one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse<T: Serialize> {
    pub success: bool,
    pub status_message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> NoteResponse<T> {
    fn ok(data: T, message: &str, status: StatusCode) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: true,
                status_message: message.to_string(),
                status: status.as_u16(),
                data: Some(data),
            }),
        )
    }
}

fn validate_note(body: &NoteRequest) -> Result<(), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title must not be blank".to_string()));
    }
    if body.title.chars().count() > TITLE_MAX_LENGTH {
        return Err(ApiError::BadRequest(
            "Maximum title length is 255 characters".to_string(),
        ));
    }
    if let Some(content) = &body.content {
        if content.chars().count() > CONTENT_MAX_LENGTH {
            return Err(ApiError::BadRequest(
                "Content is too long (max 5000 characters)".to_string(),
            ));
        }
    }
    Ok(())
}

/// Fetch a note and enforce ownership: 404 unknown, 403 foreign.
fn owned_note(state: &AppState, principal: &Principal, id: i64) -> Result<NoteRecord, ApiError> {
    let note = state
        .notes
        .find(id)?
        .ok_or_else(|| ApiError::NotFound(messages::NOTE_NOT_FOUND.to_string()))?;
    if note.owner != principal.login {
        return Err(ApiError::Forbidden(messages::NOTE_ACCESS_DENIED.to_string()));
    }
    Ok(note)
}

/// POST /api/v1/notes
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse<NoteRecord>>), ApiError> {
    validate_note(&body)?;

    let note = state
        .notes
        .insert(body.title.trim(), body.content.as_deref(), &principal.login)?;

    Ok(NoteResponse::ok(
        note,
        messages::NOTE_CREATED,
        StatusCode::CREATED,
    ))
}

/// GET /api/v1/notes
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<(StatusCode, Json<NoteResponse<Vec<NoteRecord>>>), ApiError> {
    let notes = state.notes.for_owner(&principal.login)?;
    Ok(NoteResponse::ok(notes, messages::NOTE_LIST, StatusCode::OK))
}

/// GET /api/v1/notes/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<NoteResponse<NoteRecord>>), ApiError> {
    let note = owned_note(&state, &principal, id)?;
    Ok(NoteResponse::ok(note, messages::NOTE_FOUND, StatusCode::OK))
}

/// PATCH /api/v1/notes/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(body): Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse<NoteRecord>>), ApiError> {
    owned_note(&state, &principal, id)?;
    validate_note(&body)?;

    state
        .notes
        .update(id, body.title.trim(), body.content.as_deref())?;
    let note = owned_note(&state, &principal, id)?;

    Ok(NoteResponse::ok(note, messages::NOTE_UPDATED, StatusCode::OK))
}

/// DELETE /api/v1/notes/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<NoteResponse<NoteRecord>>), ApiError> {
    let note = owned_note(&state, &principal, id)?;
    state.notes.delete(id)?;

    Ok(NoteResponse::ok(note, messages::NOTE_DELETED, StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(title: &str, content: Option<&str>) -> NoteRequest {
        NoteRequest {
            title: title.to_string(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn test_note_validation_bounds() {
        assert!(validate_note(&req("ok", None)).is_ok());
        assert!(validate_note(&req("", None)).is_err());
        assert!(validate_note(&req("   ", None)).is_err());
        assert!(validate_note(&req(&"t".repeat(255), None)).is_ok());
        assert!(validate_note(&req(&"t".repeat(256), None)).is_err());
        assert!(validate_note(&req("ok", Some(&"c".repeat(5000)))).is_ok());
        assert!(validate_note(&req("ok", Some(&"c".repeat(5001)))).is_err());
    }
}
