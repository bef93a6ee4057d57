use std::collections::HashMap;

use rocket::tokio::sync::Mutex;

use crate::model::directory::{Collections, Settings};

use super::StoreError;

/// Persistence for the directory: one settings document, plus one collections
/// document per academic year.
#[rocket::async_trait]
pub trait Backend: Send + Sync {
    /// Load the settings document, if one has ever been saved.
    async fn load_settings(&self) -> Result<Option<Settings>, StoreError>;
    /// Replace the settings document.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;
    /// Load the collections for the given academic year, if any exist.
    async fn load_year(&self, year: &str) -> Result<Option<Collections>, StoreError>;
    /// Replace the collections for the given academic year.
    async fn save_year(&self, year: &str, collections: &Collections) -> Result<(), StoreError>;
}

/// A backend that keeps everything in memory. Used by tests, and handy for demos.
#[derive(Default)]
pub struct MemoryBackend {
    settings: Mutex<Option<Settings>>,
    years: Mutex<HashMap<String, Collections>>,
}

#[rocket::async_trait]
impl Backend for MemoryBackend {
    async fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        Ok(self.settings.lock().await.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        *self.settings.lock().await = Some(settings.clone());
        Ok(())
    }

    async fn load_year(&self, year: &str) -> Result<Option<Collections>, StoreError> {
        Ok(self.years.lock().await.get(year).cloned())
    }

    async fn save_year(&self, year: &str, collections: &Collections) -> Result<(), StoreError> {
        self.years
            .lock()
            .await
            .insert(year.to_string(), collections.clone());
        Ok(())
    }
}
