use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Object {0} not found")]
    NotFound(String),

    #[error("Invalid storage path {0}")]
    InvalidPath(String),

    #[error("Failed to create storage root {0}: {1}")]
    CreateRoot(String, #[source] std::io::Error),

    #[error("Ran out of attempts to find a free name for {0}")]
    NoAvailableName(String),

    #[error(transparent)]
    ObjectStore(object_store::Error),
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Error::NotFound(path),
            _ => Error::ObjectStore(err),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
