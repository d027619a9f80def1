//! Self-service profile and password updates.
//!
//! Both handlers require an authenticated session and perform the
//! capability check explicitly before invoking the flow — the flows state
//! the precondition, the boundary enforces it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use tribu_accounts::flows::{self, ProfileForm};

use crate::auth::cookie::{
    build_session_cookie, clear_session_cookie, encode_session, session_from_headers,
};
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// PUT /api/profile
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub second_family_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

/// `PUT /api/profile` — update the mutable profile fields.
///
/// On success the session stays authenticated; a fresh cookie is issued so
/// the cached display username follows a rename.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = session_from_headers(&headers, &state.config.secret_key);
    if !session.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let form = ProfileForm {
        second_family_name: req.second_family_name,
        username: req.username,
        email: req.email,
        phone: req.phone,
    };
    let user = flows::update_profile(state.store(), &mut session, &form).await?;

    // The flow refreshed the session's display username; reissue the cookie
    // so the client's copy agrees.
    let identity = session.identity().ok_or(AppError::Unauthorized)?;
    let days = if identity.remember {
        state.config.remember_days
    } else {
        state.config.session_days
    };
    let token = encode_session(&state.config.secret_key, identity, days)?;
    let cookie = build_session_cookie(
        &token,
        state.config.https,
        identity.remember,
        state.config.remember_days,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "data": {
                "id": user.id,
                "second_family_name": user.second_family_name,
                "username": user.username,
                "email": user.email,
                "phone": user.phone
            }
        })),
    ))
}

// ---------------------------------------------------------------------------
// PUT /api/profile/password
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// `PUT /api/profile/password` — change the password.
///
/// Success invalidates the session unconditionally (the cookie is cleared);
/// the user logs in again with the new password. On any failure the cookie
/// is left alone and the session stays valid.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = session_from_headers(&headers, &state.config.secret_key);
    if !session.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    flows::change_password(
        state.store(),
        state.config.argon2_memory_kb,
        &mut session,
        &req.current_password,
        &req.new_password,
        &req.confirm_password,
    )
    .await?;

    let cookie = clear_session_cookie(state.config.https);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "data": { "ok": true } })),
    ))
}
