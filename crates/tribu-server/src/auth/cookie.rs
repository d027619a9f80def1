//! Session cookie codec.
//!
//! The core models the session as an explicit request-scoped value
//! ([`tribu_core::session::Session`]); this module is the wire form. An
//! authenticated session round-trips through an HMAC-signed JWT in the
//! `tribu_session` cookie. The remember flag decides the cookie lifetime:
//! remembered sessions get a `Max-Age`, ordinary ones are browser-session
//! cookies, mirroring the original deployment's extended-vs-ordinary trust.

use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tribu_core::session::{Identity, Session};

pub const SESSION_COOKIE: &str = "tribu_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub username: String,
    pub full_name: String,
    pub remember: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Encode an authenticated identity as a JWT. `days` is the token lifetime
/// and comes from `Config.remember_days` or `Config.session_days` depending
/// on the identity's remember flag.
pub fn encode_session(secret: &str, identity: &Identity, days: u32) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::days(i64::from(days));

    let claims = Claims {
        sub: identity.user_id,
        username: identity.username.clone(),
        full_name: identity.full_name.clone(),
        remember: identity.remember,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow!("encode_session: {}", e))
}

/// Decode and validate a session token back into an [`Identity`].
pub fn decode_session(token: &str, secret: &str) -> Result<Identity> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| anyhow!("decode_session: {}", e))?;

    Ok(Identity {
        user_id: data.claims.sub,
        username: data.claims.username,
        full_name: data.claims.full_name,
        remember: data.claims.remember,
    })
}

/// Materialize the request's [`Session`] from its cookie header.
///
/// Missing cookie, malformed token, bad signature, expired token — all
/// collapse to `Anonymous`; the boundary never errors on untrusted input
/// here.
pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Session {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("tribu_session="));

    match token.map(|t| decode_session(t, secret)) {
        Some(Ok(identity)) => Session::Authenticated(identity),
        _ => Session::Anonymous,
    }
}

/// Build the Set-Cookie value for an authenticated session. A `Max-Age` is
/// attached only for remembered sessions; otherwise the cookie lives until
/// the browser closes.
pub fn build_session_cookie(token: &str, https: bool, remember: bool, remember_days: u32) -> String {
    let secure = if https { "; Secure" } else { "" };
    if remember {
        format!(
            "{SESSION_COOKIE}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
            token,
            u64::from(remember_days) * 86_400,
            secure,
        )
    } else {
        format!(
            "{SESSION_COOKIE}={}; HttpOnly; SameSite=Strict; Path=/{}",
            token, secure,
        )
    }
}

/// Build the Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie(https: bool) -> String {
    let secure = if https { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0{}",
        secure,
    )
}
