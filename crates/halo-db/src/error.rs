use thiserror::Error;

/// Credential store failures. Precondition variants carry no detail beyond
/// their message; the HTTP layer maps each to its own status.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("user not found")]
    UserNotFound,

    #[error("guardian not found")]
    GuardianNotFound,

    #[error("only protege accounts can link to a guardian")]
    NotProtege,

    #[error("account is already linked")]
    AlreadyPaired,

    #[error("target account is not a guardian")]
    NotGuardian,

    #[error("guardian is already linked")]
    GuardianPaired,

    #[error("cannot link an account to itself")]
    SelfLink,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("email already in use")]
    EmailTaken,

    #[error("partner is already linked to another account")]
    PartnerTaken,

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<rusqlite::Error> for DbError {
    // UNIQUE violations are how the schema backstops email and pairing
    // exclusivity, so surface them as their domain errors.
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref err, Some(ref msg)) = e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation {
                if msg.contains("users.email") {
                    return DbError::EmailTaken;
                }
                if msg.contains("users.partner_email") {
                    return DbError::PartnerTaken;
                }
            }
        }
        DbError::Sqlite(e)
    }
}
