use rusqlite::{Connection, Row, types::Type};
use tracing::info;

use halo_types::models::Role;

use crate::models::{ProfileUpdate, UserRow};
use crate::{Database, DbError, Result};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, partner_email";

impl Database {
    // -- Users --

    /// Insert a new account and return its id. The password must already be hashed.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Option<Role>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, email, password_hash, role.map(Role::as_str)],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
        })
    }

    /// Apply the provided profile fields and return the updated row.
    ///
    /// When a paired account changes email, the partner's pointer is moved
    /// to the new address in the same transaction.
    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let current = query_user_by_id(&tx, id)?.ok_or(DbError::UserNotFound)?;

            let mut sets: Vec<&str> = Vec::new();
            let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();
            if let Some(name) = &update.name {
                sets.push("name = ?");
                params.push(name);
            }
            if let Some(email) = &update.email {
                sets.push("email = ?");
                params.push(email);
            }
            if let Some(hash) = &update.password_hash {
                sets.push("password_hash = ?");
                params.push(hash);
            }

            if sets.is_empty() {
                return Ok(current);
            }

            let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
            params.push(&id);
            tx.execute(&sql, params.as_slice())?;

            if let (Some(new_email), Some(partner)) = (&update.email, &current.partner_email) {
                if *new_email != current.email {
                    tx.execute(
                        "UPDATE users SET partner_email = ?1
                         WHERE email = ?2 AND partner_email = ?3",
                        rusqlite::params![new_email, partner, current.email],
                    )?;
                }
            }

            let updated = query_user_by_id(&tx, id)?.ok_or(DbError::UserNotFound)?;
            tx.commit()?;

            info!("Updated profile for user {}", id);
            Ok(updated)
        })
    }
}

pub(crate) fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))?;
    stmt.query_row([email], read_user).optional()
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    stmt.query_row([id], read_user).optional()
}

fn read_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    let role = row
        .get::<_, Option<String>>(4)?
        .map(|s| s.parse::<Role>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        partner_email: row.get(5)?,
    })
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
