use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A persisted user row. Owned exclusively by the store; everything outside
/// it works with copies.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub given_name: String,
    pub first_family_name: String,
    pub second_family_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Display name cached into the session at login.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.first_family_name)
    }
}

/// Fields for a new row. Names are already normalized and the password
/// already hashed by the time this reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub given_name: String,
    pub first_family_name: String,
    pub second_family_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// The four profile fields a user may change about themselves.
/// `given_name`, `first_family_name` and `password_hash` are never touched
/// by a profile update.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub second_family_name: Option<String>,
    pub username: String,
    pub email: String,
    pub phone: String,
}

/// Which uniqueness-constrained column a failed write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictField {
    Email,
    Username,
    Phone,
}

impl ConflictField {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictField::Email => "email",
            ConflictField::Username => "username",
            ConflictField::Phone => "phone",
        }
    }
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Classified per column at
    /// the store boundary — no database error text leaks past it.
    #[error("{0} already taken")]
    Conflict(ConflictField),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence interface for user rows.
///
/// The default implementation is DuckDB-backed (`tribu-duckdb`); tests swap
/// in an in-memory implementation. Implementations must treat the database's
/// own uniqueness enforcement as the sole authority for conflicts — never
/// check-then-insert — so racing writers resolve deterministically.
///
/// Every operation acquires its connection for its own duration only and
/// releases it on all exit paths before returning.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Look up by login identifier: matched against email first, then
    /// username. First match wins.
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Atomic insert. A uniqueness violation yields `Conflict` naming the
    /// offending field; no partial row may persist.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Returns true iff exactly one row matched and was updated.
    async fn update_password(&self, id: i64, new_hash: &str) -> Result<bool, StoreError>;

    /// Update the mutable profile fields of one row. Same conflict contract
    /// as `insert`, scoped to the updated row.
    async fn update_profile(&self, id: i64, changes: ProfileUpdate) -> Result<User, StoreError>;
}
