use diesel::result::DatabaseErrorKind;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Object not found")]
    NotFound,

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Database Error: {0}")]
    Db(diesel::result::Error),

    #[error("Database Pool Error: {0}")]
    Pool(#[from] deadpool_diesel::PoolError),

    #[error("Database Error: {0}")]
    Interact(String),

    #[error("Migration Error: {0}")]
    Migration(String),
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Error::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Error::Conflict(info.constraint_name().unwrap_or("unique").to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                Error::Constraint(info.constraint_name().unwrap_or("check").to_string())
            }
            _ => Error::Db(err),
        }
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(err: deadpool_diesel::InteractError) -> Self {
        Error::Interact(err.to_string())
    }
}
