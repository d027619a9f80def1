//! Account flows: registration, login, password change, profile update.
//!
//! Flows are plain async functions over a [`UserStore`] plus the caller's
//! request-scoped [`Session`]. They return tagged outcomes; the calling
//! boundary maps those to user-facing messages and never sees internal
//! persistence error text. Flows that can fail validation borrow the form,
//! so the caller still holds the submitted values for re-rendering.

use anyhow::anyhow;
use thiserror::Error;

use tribu_core::names::normalize_name;
use tribu_core::session::Session;
use tribu_core::validate::{
    validate_profile_update, validate_registration, RegistrationInput, Violation,
};

use crate::password::{hash_password, verify_password};
use crate::store::{ConflictField, NewUser, ProfileUpdate, StoreError, User, UserStore};

/// Raw registration submission, as decoded by the boundary.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub given_name: String,
    pub first_family_name: String,
    pub second_family_name: String,
    pub phone: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Raw profile-update submission (the four mutable fields).
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub second_family_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("validation failed")]
    Validation(Vec<Violation>),

    #[error("{0} already taken")]
    Conflict(ConflictField),

    /// Deliberately generic: does not reveal whether the identifier or the
    /// password was wrong.
    #[error("identifier or password incorrect")]
    AuthenticationFailed,

    #[error("current password incorrect")]
    WrongCurrentPassword,

    #[error("new passwords do not match")]
    PasswordMismatch,

    #[error("new password must not be empty")]
    EmptyPassword,

    /// Precondition failure: the operation requires an authenticated session.
    #[error("authenticated session required")]
    NotAuthenticated,

    /// Unexpected store-layer failure. Logged by the boundary, surfaced to
    /// users as a generic message.
    #[error("persistence failure")]
    Persistence(#[source] anyhow::Error),
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(field) => AccountError::Conflict(field),
            StoreError::Other(e) => AccountError::Persistence(e),
        }
    }
}

/// Register a new user: validate (collecting every violation), normalize the
/// name fields, hash the password, insert.
pub async fn register(
    store: &dyn UserStore,
    argon2_m_cost: u32,
    form: &RegistrationForm,
) -> Result<User, AccountError> {
    let violations = validate_registration(&RegistrationInput {
        given_name: &form.given_name,
        first_family_name: &form.first_family_name,
        phone: &form.phone,
        username: &form.username,
        password: &form.password,
        password_confirm: &form.password_confirm,
    });
    if !violations.is_empty() {
        return Err(AccountError::Validation(violations));
    }

    let second = normalize_name(&form.second_family_name);
    let new_user = NewUser {
        given_name: normalize_name(&form.given_name),
        first_family_name: normalize_name(&form.first_family_name),
        second_family_name: (!second.is_empty()).then_some(second),
        phone: form.phone.clone(),
        email: form.email.clone(),
        username: form.username.clone(),
        password_hash: hash_password(&form.password, argon2_m_cost)
            .map_err(AccountError::Persistence)?,
    };

    Ok(store.insert(new_user).await?)
}

/// Authenticate by email-or-username identifier and establish the session.
///
/// On any failure the session is left untouched (still Anonymous for a login
/// attempt) and the caller gets the single generic `AuthenticationFailed`.
pub async fn login(
    store: &dyn UserStore,
    identifier: &str,
    password: &str,
    remember: bool,
    session: &mut Session,
) -> Result<User, AccountError> {
    let user = store
        .find_by_identifier(identifier)
        .await
        .map_err(AccountError::Persistence)?;

    let user = match user {
        Some(user) if verify_password(password, &user.password_hash) => user,
        _ => return Err(AccountError::AuthenticationFailed),
    };

    session.establish(user.id, &user.username, &user.full_name(), remember);
    Ok(user)
}

/// Change the password of the authenticated user.
///
/// Re-verifies the current password before anything else. On success the
/// session is invalidated unconditionally — policy is to force a fresh login
/// after any password change. On failure the session is unchanged.
pub async fn change_password(
    store: &dyn UserStore,
    argon2_m_cost: u32,
    session: &mut Session,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), AccountError> {
    let user_id = session
        .identity()
        .ok_or(AccountError::NotAuthenticated)?
        .user_id;

    let user = store
        .find_by_id(user_id)
        .await
        .map_err(AccountError::Persistence)?
        .ok_or(AccountError::AuthenticationFailed)?;

    if !verify_password(current_password, &user.password_hash) {
        return Err(AccountError::WrongCurrentPassword);
    }
    if new_password != confirm_password {
        return Err(AccountError::PasswordMismatch);
    }
    if new_password.is_empty() {
        return Err(AccountError::EmptyPassword);
    }

    let new_hash =
        hash_password(new_password, argon2_m_cost).map_err(AccountError::Persistence)?;
    let updated = store.update_password(user.id, &new_hash).await?;
    if !updated {
        return Err(AccountError::Persistence(anyhow!(
            "password update matched no row for user {user_id}"
        )));
    }

    session.invalidate();
    Ok(())
}

/// Update the mutable profile fields of the authenticated user.
///
/// Contrast with [`change_password`]: on success the session *stays*
/// authenticated, with its cached display username refreshed to the new
/// value.
pub async fn update_profile(
    store: &dyn UserStore,
    session: &mut Session,
    form: &ProfileForm,
) -> Result<User, AccountError> {
    let user_id = session
        .identity()
        .ok_or(AccountError::NotAuthenticated)?
        .user_id;

    let violations = validate_profile_update(&form.phone, &form.username);
    if !violations.is_empty() {
        return Err(AccountError::Validation(violations));
    }

    let second = normalize_name(&form.second_family_name);
    let changes = ProfileUpdate {
        second_family_name: (!second.is_empty()).then_some(second),
        username: form.username.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
    };

    let user = store.update_profile(user_id, changes).await?;
    session.update_display_username(&user.username);
    Ok(user)
}
