/// Database row types. These map directly to SQLite rows.
/// Distinct from halo-types API models to keep the DB layer independent.
use halo_types::models::{Role, User};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub partner_email: Option<String>,
}

impl UserRow {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            partner: self.partner_email.clone(),
        }
    }

    pub fn is_paired(&self) -> bool {
        self.partner_email.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GuardianRow {
    pub name: String,
    pub email: String,
}

/// Fields to change on a profile update. The password is already hashed.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
