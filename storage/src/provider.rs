use std::{path::PathBuf, sync::Arc};

use object_store::{local::LocalFileSystem, memory::InMemory, ObjectStore};

use crate::{
    error::{Error, Result},
    operator::Operator,
};

#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// Files on local disk, under `root`.
    Local { root: PathBuf },
    /// Process-local storage that disappears on exit.
    Memory,
}

impl ProviderConfig {
    pub async fn create_operator(&self) -> Result<Operator> {
        let store: Arc<dyn ObjectStore> = match self {
            Self::Local { root } => {
                // LocalFileSystem canonicalizes its prefix, so it has to exist first.
                tokio::fs::create_dir_all(root)
                    .await
                    .map_err(|e| Error::CreateRoot(root.display().to_string(), e))?;
                Arc::new(LocalFileSystem::new_with_prefix(root)?)
            }
            Self::Memory => Arc::new(InMemory::new()),
        };

        Ok(Operator::new(store))
    }
}
