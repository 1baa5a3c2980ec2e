//! Editor session handlers: login, edits, icon upload and save.
//!
//! Every route except login requires `Authorization: Bearer <token>`
//! carrying the token returned by `POST /admin/login`.

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use linkcard_core::Edit;
use uuid::Uuid;

use crate::error::ApiError;
use crate::schema::admin::{
    EditResponse, LinkRequest, LoginRequest, LoginResponse, ProfileRequest, SessionView,
    UpdateTitleRequest,
};
use crate::state::AppState;

/// Session token taken from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct SessionToken(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing session token".to_string()))?;
        let raw = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected a Bearer token".to_string()))?;
        let token = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::Unauthorized("malformed session token".to_string()))?;
        Ok(SessionToken(token))
    }
}

/// Checks the admin password and opens a session.
///
/// `POST /admin/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, snapshot) = state.service.login(&req.password).await?;
    Ok(Json(LoginResponse { token, snapshot }))
}

/// Closes the session.
///
/// `POST /admin/logout`
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.service.logout(token) {
        return Err(ApiError::Unauthorized(
            "unknown or expired session".to_string(),
        ));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Returns the session's working copy.
///
/// `GET /admin/snapshot`
pub async fn get_snapshot(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.service.session_view(token)?))
}

/// Applies any [`Edit`].
///
/// `POST /admin/edits`
pub async fn apply_edit(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Json(edit): Json<Edit>,
) -> Result<Json<EditResponse>, ApiError> {
    Ok(Json(state.service.apply_edit(token, &edit).await?))
}

/// `PUT /admin/title`
pub async fn update_title(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Json(req): Json<UpdateTitleRequest>,
) -> Result<Json<EditResponse>, ApiError> {
    let edit = Edit::UpdateTitle { title: req.title };
    Ok(Json(state.service.apply_edit(token, &edit).await?))
}

/// `PATCH /admin/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Json(profile): Json<ProfileRequest>,
) -> Result<Json<EditResponse>, ApiError> {
    let edit = Edit::UpdateProfile { profile };
    Ok(Json(state.service.apply_edit(token, &edit).await?))
}

/// `POST /admin/links`
pub async fn add_link(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Json(link): Json<LinkRequest>,
) -> Result<Json<EditResponse>, ApiError> {
    let edit = Edit::AddLink { link };
    Ok(Json(state.service.apply_edit(token, &edit).await?))
}

/// `PUT /admin/links/{index}`
pub async fn update_link(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Path(index): Path<usize>,
    Json(link): Json<LinkRequest>,
) -> Result<Json<EditResponse>, ApiError> {
    let edit = Edit::UpdateLink { index, link };
    Ok(Json(state.service.apply_edit(token, &edit).await?))
}

/// `DELETE /admin/links/{index}`
pub async fn delete_link(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Path(index): Path<usize>,
) -> Result<Json<EditResponse>, ApiError> {
    let edit = Edit::DeleteLink { index };
    Ok(Json(state.service.apply_edit(token, &edit).await?))
}

/// Stores the raw image body as the profile icon.
///
/// `POST /admin/profile/icon`
pub async fn upload_icon(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EditResponse>, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(Json(
        state.service.upload_icon(token, content_type, &body).await?,
    ))
}

/// Saves the working copy.
///
/// `POST /admin/save`
pub async fn save(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<EditResponse>, ApiError> {
    Ok(Json(state.service.save_session(token).await?))
}
