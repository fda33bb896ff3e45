use crate::errors::StoreError;
use crate::models::Item;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, error};

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<Item>, StoreError>;

    async fn save_all(&self, items: &[Item]) -> Result<(), StoreError>;
}

pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ItemRepository for JsonFileRepository {
    async fn load(&self) -> Result<Vec<Item>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                error!(path = %self.path.display(), "failed to parse items file: {err}");
                StoreError::from(err)
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no items file yet, starting empty");
                Ok(Vec::new())
            }
            Err(err) => {
                error!(path = %self.path.display(), "failed to read items file: {err}");
                Err(err.into())
            }
        }
    }

    async fn save_all(&self, items: &[Item]) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(items)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    items: Mutex<Vec<Item>>,
    saves: Mutex<usize>,
}

impl MemoryRepository {
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            saves: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items.lock().map(|items| items.clone()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|count| *count).unwrap_or_default()
    }
}

#[async_trait]
impl ItemRepository for MemoryRepository {
    async fn load(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save_all(&self, items: &[Item]) -> Result<(), StoreError> {
        if let Ok(mut stored) = self.items.lock() {
            *stored = items.to_vec();
        }
        if let Ok(mut count) = self.saves.lock() {
            *count += 1;
        }
        Ok(())
    }
}
