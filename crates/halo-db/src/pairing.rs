//! Guardian/protege pairing.
//!
//! A pairing is stored as `partner_email` on both rows. Every operation that
//! touches two rows runs in one immediate transaction, so a concurrent reader
//! never sees a half-linked pair.

use rusqlite::TransactionBehavior;
use tracing::info;

use halo_types::models::Role;

use crate::models::GuardianRow;
use crate::queries::{query_user_by_email, query_user_by_id};
use crate::{Database, DbError, Result};

/// Outcome of a role change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    /// The account already had the requested role.
    Unchanged,
    /// The role was replaced. `unlinked` names the former partner if the
    /// account was paired before the change.
    Changed {
        previous: Option<Role>,
        unlinked: Option<String>,
    },
}

impl Database {
    /// Link a protege to an unpaired guardian.
    pub fn link_users(&self, protege_email: &str, guardian_email: &str) -> Result<()> {
        if !guardian_email.contains('@') {
            return Err(DbError::InvalidEmail);
        }
        if guardian_email == protege_email {
            return Err(DbError::SelfLink);
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let protege = query_user_by_email(&tx, protege_email)?.ok_or(DbError::UserNotFound)?;
            if protege.role != Some(Role::Protege) {
                return Err(DbError::NotProtege);
            }
            if protege.is_paired() {
                return Err(DbError::AlreadyPaired);
            }

            let guardian =
                query_user_by_email(&tx, guardian_email)?.ok_or(DbError::GuardianNotFound)?;
            if guardian.role != Some(Role::Guardian) {
                return Err(DbError::NotGuardian);
            }
            if guardian.is_paired() {
                return Err(DbError::GuardianPaired);
            }

            tx.execute(
                "UPDATE users SET partner_email = ?1 WHERE email = ?2",
                [guardian_email, protege_email],
            )?;
            tx.execute(
                "UPDATE users SET partner_email = ?1 WHERE email = ?2",
                [protege_email, guardian_email],
            )?;
            tx.commit()?;

            info!("Linked protege {} with guardian {}", protege_email, guardian_email);
            Ok(())
        })
    }

    /// Remove the caller's pairing. Returns the former partner, or `None`
    /// if the caller was not paired.
    ///
    /// The partner's pointer is only cleared if it still points back at the caller.
    pub fn unlink_user(&self, email: &str) -> Result<Option<String>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let user = query_user_by_email(&tx, email)?.ok_or(DbError::UserNotFound)?;
            let Some(partner) = user.partner_email else {
                return Ok(None);
            };

            tx.execute("UPDATE users SET partner_email = NULL WHERE email = ?1", [email])?;
            tx.execute(
                "UPDATE users SET partner_email = NULL WHERE email = ?1 AND partner_email = ?2",
                [partner.as_str(), email],
            )?;
            tx.commit()?;

            info!("Unlinked {} from {}", email, partner);
            Ok(Some(partner))
        })
    }

    /// Change an account's role, unlinking it first if it is paired.
    ///
    /// Unlink and role update commit together; if the update fails the
    /// pairing is left intact. The partner's pointer is cleared using the
    /// stored reference without re-checking that it points back.
    pub fn change_role(&self, user_id: i64, new_role: Option<Role>) -> Result<RoleChange> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let user = query_user_by_id(&tx, user_id)?.ok_or(DbError::UserNotFound)?;
            if user.role == new_role {
                return Ok(RoleChange::Unchanged);
            }

            if let Some(partner) = &user.partner_email {
                tx.execute("UPDATE users SET partner_email = NULL WHERE id = ?1", [user_id])?;
                tx.execute(
                    "UPDATE users SET partner_email = NULL WHERE email = ?1",
                    [partner.as_str()],
                )?;
            }

            tx.execute(
                "UPDATE users SET role = ?1 WHERE id = ?2",
                rusqlite::params![new_role.map(Role::as_str), user_id],
            )?;
            tx.commit()?;

            info!(
                "Role of {} changed from {:?} to {:?}",
                user.email, user.role, new_role
            );
            Ok(RoleChange::Changed {
                previous: user.role,
                unlinked: user.partner_email,
            })
        })
    }

    /// Unpaired guardians ordered by name.
    pub fn available_guardians(&self) -> Result<Vec<GuardianRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, email FROM users
                 WHERE role = 'guardian' AND partner_email IS NULL
                 ORDER BY name ASC",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(GuardianRow {
                        name: row.get(0)?,
                        email: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}
