use anyhow::Result;
use tracing::info;

use halo_db::Database;
use halo_types::models::Role;

use crate::password::hash_password;

const DEMO_PASSWORD: &str = "12";

const DEMO_ACCOUNTS: &[(&str, &str, Option<Role>)] = &[
    ("John", "john@email.com", Some(Role::Guardian)),
    ("Johny", "johny@email.com", Some(Role::Protege)),
    ("No Type User", "notype@email.com", None),
];

/// Populate an empty users table with the demo accounts, linking John and
/// Johny. Returns false if any account already existed.
pub fn seed_demo_accounts(db: &Database) -> Result<bool> {
    if db.count_users()? > 0 {
        return Ok(false);
    }

    for (name, email, role) in DEMO_ACCOUNTS {
        let hash = hash_password(DEMO_PASSWORD)?;
        db.create_user(name, email, &hash, *role)?;
        info!("Seeded {} ({})", email, role.map_or("no role", |r| r.as_str()));
    }

    db.link_users("johny@email.com", "john@email.com")?;
    info!("Seeded demo accounts");
    Ok(true)
}
