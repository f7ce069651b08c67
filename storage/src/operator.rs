use std::sync::Arc;

use bytes::Bytes;
use object_store::{path::Path, ObjectStore};
use tracing::{event, instrument, Level};

use crate::error::{Error, Result};

const NAME_ATTEMPTS: usize = 100;
const SUFFIX_LEN: usize = 7;

#[derive(Clone)]
pub struct Operator {
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("store", &self.store.to_string())
            .finish()
    }
}

fn make_path(location: &str) -> Result<Path> {
    Path::parse(location).map_err(|_| Error::InvalidPath(location.to_string()))
}

/// Insert `_<suffix>` between the file stem and its extension.
fn with_suffix(location: &str, suffix: &str) -> String {
    let name_start = location.rfind('/').map(|i| i + 1).unwrap_or(0);
    match location[name_start..].rfind('.') {
        Some(0) | None => format!("{location}_{suffix}"),
        Some(dot) => {
            let (stem, ext) = location.split_at(name_start + dot);
            format!("{stem}_{suffix}{ext}")
        }
    }
}

fn random_suffix() -> String {
    let mut s = uuid::Uuid::new_v4().simple().to_string();
    s.truncate(SUFFIX_LEN);
    s
}

impl Operator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, location: &str) -> Result<Bytes> {
        let p = make_path(location)?;
        let result = self.store.get(&p).await?;
        result.bytes().await.map_err(Error::from)
    }

    /// Write `bytes` to `location`, replacing anything already there.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn put(&self, location: &str, bytes: Bytes) -> Result<()> {
        let p = make_path(location)?;
        self.store.put(&p, bytes.into()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, location: &str) -> Result<bool> {
        let p = make_path(location)?;
        match self.store.head(&p).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// The file names directly inside `dir`. A directory that doesn't exist is empty.
    #[instrument(skip(self))]
    pub async fn list(&self, dir: &str) -> Result<Vec<String>> {
        let p = make_path(dir)?;
        let listing = match self.store.list_with_delimiter(Some(&p)).await {
            Ok(listing) => listing,
            Err(object_store::Error::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let names = listing
            .objects
            .into_iter()
            .filter_map(|meta| meta.location.filename().map(String::from))
            .collect();
        Ok(names)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, location: &str) -> Result<()> {
        let p = make_path(location)?;
        self.store.delete(&p).await?;
        Ok(())
    }

    /// Return `location` if nothing is stored there, otherwise the first free variant of it with a
    /// random suffix added to the file stem.
    #[instrument(skip(self))]
    pub async fn available_location(&self, location: &str) -> Result<String> {
        if !self.exists(location).await? {
            return Ok(location.to_string());
        }

        for _ in 0..NAME_ATTEMPTS {
            let candidate = with_suffix(location, &random_suffix());
            if !self.exists(&candidate).await? {
                event!(Level::DEBUG, %candidate, "Renamed to avoid collision");
                return Ok(candidate);
            }
        }

        Err(Error::NoAvailableName(location.to_string()))
    }
}
