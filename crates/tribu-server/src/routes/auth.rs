//! Registration, login, logout and session inspection.
//!
//! Handlers here are thin: decode the JSON body, call the account flow,
//! translate the tagged outcome to HTTP. The session travels as a signed
//! cookie (see [`crate::auth::cookie`]); handlers materialize it per
//! request and write it back when a flow changed it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use tribu_accounts::flows::{self, RegistrationForm};
use tribu_core::session::Session;

use crate::auth::cookie::{
    build_session_cookie, clear_session_cookie, encode_session, session_from_headers,
};
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /api/auth/register
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub given_name: String,
    pub first_family_name: String,
    #[serde(default)]
    pub second_family_name: String,
    pub phone: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// `POST /api/auth/register` — create an account.
///
/// 201 with the new user's id on success; 400 listing every validation
/// violation; 409 naming the uniqueness-conflicted field. Does not log the
/// new user in — the client proceeds to `/api/auth/login`.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let form = RegistrationForm {
        given_name: req.given_name,
        first_family_name: req.first_family_name,
        second_family_name: req.second_family_name,
        phone: req.phone,
        email: req.email,
        username: req.username,
        password: req.password,
        password_confirm: req.password_confirm,
    };

    let user = flows::register(state.store(), state.config.argon2_memory_kb, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "id": user.id,
                "username": user.username,
                "email": user.email
            }
        })),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username, used interchangeably.
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

/// `POST /api/auth/login` — authenticate and set the session cookie.
///
/// Unknown identifier and wrong password both answer 401 with the same
/// generic message.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = Session::default();
    flows::login(
        state.store(),
        &req.identifier,
        &req.password,
        req.remember,
        &mut session,
    )
    .await?;

    // login() just established the session.
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
                "user_id": identity.user_id,
                "username": identity.username,
                "full_name": identity.full_name,
                "remember": identity.remember
            }
        })),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/auth/logout
// ---------------------------------------------------------------------------

/// `POST /api/auth/logout` — clear the session cookie. Always 200.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.config.https);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "data": { "ok": true } })),
    )
}

// ---------------------------------------------------------------------------
// GET /api/auth/session
// ---------------------------------------------------------------------------

/// `GET /api/auth/session` — inspect the current session. 401 when
/// anonymous.
pub async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = session_from_headers(&headers, &state.config.secret_key);
    let identity = session.identity().ok_or(AppError::Unauthorized)?;

    Ok(Json(json!({
        "data": {
            "authenticated": true,
            "user_id": identity.user_id,
            "username": identity.username,
            "full_name": identity.full_name,
            "remember": identity.remember
        }
    })))
}
