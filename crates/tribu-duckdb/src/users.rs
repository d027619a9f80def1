//! `UserStore` implementation over DuckDB.
//!
//! Writes never pre-check uniqueness: the INSERT/UPDATE itself is the sole
//! authority, so racing writers resolve deterministically at the constraint.
//! When a write is rejected, the backend probes — still holding the
//! connection lock — which of the three unique columns is taken and returns
//! the matching structured [`ConflictField`]. Database error text never
//! crosses the store boundary.

use anyhow::anyhow;
use async_trait::async_trait;
use duckdb::Connection;

use tribu_accounts::store::{ConflictField, NewUser, ProfileUpdate, StoreError, User, UserStore};

use crate::DuckDbBackend;

const USER_COLUMNS: &str =
    "id, nombre, primer_apellido, segundo_apellido, telefono, email, usuario, password_hash";

fn map_user(row: &duckdb::Row<'_>) -> duckdb::Result<User> {
    Ok(User {
        id: row.get(0)?,
        given_name: row.get(1)?,
        first_family_name: row.get(2)?,
        second_family_name: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        username: row.get(6)?,
        password_hash: row.get(7)?,
    })
}

fn query_user(
    conn: &Connection,
    sql: &str,
    params: &[&dyn duckdb::ToSql],
) -> anyhow::Result<Option<User>> {
    let mut stmt = conn.prepare(sql)?;
    match stmt.query_row(params, map_user) {
        Ok(user) => Ok(Some(user)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// DuckDB surfaces constraint violations as `DuckDBFailure`. The probe below
/// confirms (and names) the violated column, so a non-constraint failure
/// that happens to use the same variant still falls through to a generic
/// error.
fn is_write_rejection(e: &duckdb::Error) -> bool {
    matches!(e, duckdb::Error::DuckDBFailure(..))
}

/// Probe which unique column already holds `email`/`username`/`phone`,
/// excluding `exclude_id` when classifying an update against the row's own
/// values. Column names come from the fixed probe list; the values are
/// bound parameters.
///
/// Probe order is fixed (email, username, phone) so a multi-field collision
/// classifies deterministically.
fn taken_conflict(
    conn: &Connection,
    email: &str,
    username: &str,
    phone: &str,
    exclude_id: Option<i64>,
) -> anyhow::Result<Option<ConflictField>> {
    let probes = [
        ("email", email, ConflictField::Email),
        ("usuario", username, ConflictField::Username),
        ("telefono", phone, ConflictField::Phone),
    ];
    for (column, value, field) in probes {
        let taken: i64 = match exclude_id {
            Some(id) => conn
                .prepare(&format!(
                    "SELECT COUNT(*) FROM users WHERE {column} = ?1 AND id <> ?2"
                ))?
                .query_row(duckdb::params![value, id], |row| row.get(0))?,
            None => conn
                .prepare(&format!("SELECT COUNT(*) FROM users WHERE {column} = ?1"))?
                .query_row(duckdb::params![value], |row| row.get(0))?,
        };
        if taken > 0 {
            return Ok(Some(field));
        }
    }
    Ok(None)
}

enum RewriteFailure {
    Store(StoreError),
    /// The reinsert itself was rejected — candidate uniqueness conflict.
    Rejected(duckdb::Error),
}

/// Delete-and-reinsert one user row with its mutable profile fields
/// replaced, inside a transaction. Returns the rewritten row on commit; on
/// a rejected reinsert the transaction is dropped (rolled back) so the
/// original row survives.
fn rewrite_profile_row(
    conn: &mut Connection,
    id: i64,
    changes: &ProfileUpdate,
) -> Result<User, RewriteFailure> {
    let tx = conn
        .transaction()
        .map_err(|e| RewriteFailure::Store(StoreError::Other(e.into())))?;

    let current = query_user(
        &tx,
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        duckdb::params![id],
    )
    .map_err(|e| RewriteFailure::Store(StoreError::Other(e)))?
    .ok_or_else(|| RewriteFailure::Store(StoreError::Other(anyhow!("user {id} not found"))))?;

    tx.execute("DELETE FROM users WHERE id = ?1", duckdb::params![id])
        .map_err(|e| RewriteFailure::Store(StoreError::Other(e.into())))?;

    tx.execute(
        "INSERT INTO users (id, nombre, primer_apellido, segundo_apellido, telefono, email, usuario, password_hash) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        duckdb::params![
            id,
            current.given_name,
            current.first_family_name,
            changes.second_family_name,
            changes.phone,
            changes.email,
            changes.username,
            current.password_hash
        ],
    )
    .map_err(RewriteFailure::Rejected)?;

    tx.commit()
        .map_err(|e| RewriteFailure::Store(StoreError::Other(e.into())))?;

    Ok(User {
        id,
        given_name: current.given_name,
        first_family_name: current.first_family_name,
        second_family_name: changes.second_family_name.clone(),
        phone: changes.phone.clone(),
        email: changes.email.clone(),
        username: changes.username.clone(),
        password_hash: current.password_hash,
    })
}

#[async_trait]
impl UserStore for DuckDbBackend {
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        let conn = self.conn.lock().await;
        // Email first, username as fallback — first match wins when a string
        // is one user's email and another user's username.
        if let Some(user) = query_user(
            &conn,
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            duckdb::params![identifier],
        )? {
            return Ok(Some(user));
        }
        query_user(
            &conn,
            &format!("SELECT {USER_COLUMNS} FROM users WHERE usuario = ?1"),
            duckdb::params![identifier],
        )
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let conn = self.conn.lock().await;
        query_user(
            &conn,
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            duckdb::params![id],
        )
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let conn = self.conn.lock().await;

        let inserted = conn
            .prepare(
                "INSERT INTO users (nombre, primer_apellido, segundo_apellido, telefono, email, usuario, password_hash) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
            )
            .and_then(|mut stmt| {
                stmt.query_row(
                    duckdb::params![
                        user.given_name,
                        user.first_family_name,
                        user.second_family_name,
                        user.phone,
                        user.email,
                        user.username,
                        user.password_hash
                    ],
                    |row| row.get::<_, i64>(0),
                )
            });

        match inserted {
            Ok(id) => Ok(User {
                id,
                given_name: user.given_name,
                first_family_name: user.first_family_name,
                second_family_name: user.second_family_name,
                phone: user.phone,
                email: user.email,
                username: user.username,
                password_hash: user.password_hash,
            }),
            Err(e) if is_write_rejection(&e) => {
                match taken_conflict(&conn, &user.email, &user.username, &user.phone, None)
                    .map_err(StoreError::Other)?
                {
                    Some(field) => Err(StoreError::Conflict(field)),
                    None => Err(StoreError::Other(e.into())),
                }
            }
            Err(e) => Err(StoreError::Other(e.into())),
        }
    }

    async fn update_password(&self, id: i64, new_hash: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                duckdb::params![new_hash, id],
            )
            .map_err(|e| StoreError::Other(e.into()))?;
        Ok(changed == 1)
    }

    /// Rewrites the row as DELETE + INSERT inside one transaction rather
    /// than a single UPDATE: DuckDB turns an UPDATE of indexed columns into
    /// a same-statement delete+insert whose uniqueness check still sees the
    /// old row, throwing spurious constraint violations. Across statements
    /// within one transaction the delete *is* visible, and an abandoned
    /// transaction restores the row, so atomicity holds.
    async fn update_profile(&self, id: i64, changes: ProfileUpdate) -> Result<User, StoreError> {
        let mut conn = self.conn.lock().await;

        match rewrite_profile_row(&mut conn, id, &changes) {
            Ok(user) => Ok(user),
            Err(RewriteFailure::Store(e)) => Err(e),
            // The transaction was dropped, so the delete is rolled back;
            // classify against the intact table.
            Err(RewriteFailure::Rejected(e)) if is_write_rejection(&e) => {
                match taken_conflict(
                    &conn,
                    &changes.email,
                    &changes.username,
                    &changes.phone,
                    Some(id),
                )
                .map_err(StoreError::Other)?
                {
                    Some(field) => Err(StoreError::Conflict(field)),
                    None => Err(StoreError::Other(e.into())),
                }
            }
            Err(RewriteFailure::Rejected(e)) => Err(StoreError::Other(e.into())),
        }
    }
}
