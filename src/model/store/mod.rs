//! The directory store: the single source of truth for every collection and setting.
//!
//! All reads and writes go through [`Store`], which serialises them behind one
//! async mutex. A write works on a copy of the [`Directory`] and only replaces
//! the live copy once the backend has durably accepted the new state, so a
//! failed operation or a failed persist never leaves a partial write behind.

use std::sync::Arc;

use rocket::{
    request::{self, FromRequest, Request},
    tokio::sync::Mutex,
    State,
};
use thiserror::Error;

use crate::model::directory::{Directory, Settings};

mod backend;
mod file;

pub use backend::{Backend, MemoryBackend};
pub use file::JsonFileBackend;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored data is malformed: {0}")]
    Format(#[from] rocket::serde::json::serde_json::Error),
}

struct Inner {
    backend: Box<dyn Backend>,
    directory: Mutex<Directory>,
}

/// Handle on the directory store. Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Open the store, loading the settings and the collections of the current academic year.
    /// Missing documents are created empty, with `default_year` as the academic year.
    pub async fn open<B>(backend: B, default_year: &str) -> Result<Self, StoreError>
    where
        B: Backend + 'static,
    {
        let settings = match backend.load_settings().await? {
            Some(settings) => settings,
            None => {
                let settings = Settings::new(default_year);
                backend.save_settings(&settings).await?;
                settings
            }
        };
        let collections = backend
            .load_year(&settings.academic_year)
            .await?
            .unwrap_or_default();
        debug!(
            "Opened store for academic year {:?} ({} students, {} votes)",
            settings.academic_year,
            collections.students.len(),
            collections.votes.len()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                directory: Mutex::new(Directory::new(settings, collections)),
            }),
        })
    }

    /// Open a store that lives purely in memory.
    pub async fn in_memory(default_year: &str) -> Result<Self, StoreError> {
        Self::open(MemoryBackend::default(), default_year).await
    }

    /// Run a read-only operation against a consistent snapshot of the directory.
    pub async fn read<T, F>(&self, op: F) -> T
    where
        F: FnOnce(&Directory) -> T,
    {
        let directory = self.inner.directory.lock().await;
        op(&directory)
    }

    /// Run a read-modify-write cycle.
    ///
    /// The operation sees a private copy of the directory. If it succeeds, whatever
    /// it changed is persisted and then becomes the live state. If it fails, or the
    /// persist fails, the live state is left untouched. The lock is held for the
    /// whole cycle, so concurrent writers cannot interleave.
    pub async fn write<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut Directory) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut live = self.inner.directory.lock().await;
        let mut draft = live.clone();
        let output = op(&mut draft)?;

        if draft.settings.academic_year != live.settings.academic_year {
            // Changing year is only done through `switch_year`, which reloads the collections.
            warn!("Academic year changed inside a plain write; ignoring the change");
            draft.settings.academic_year = live.settings.academic_year.clone();
        }
        if draft.settings != live.settings {
            self.inner.backend.save_settings(&draft.settings).await?;
        }
        if draft.collections != live.collections {
            self.inner
                .backend
                .save_year(&draft.settings.academic_year, &draft.collections)
                .await?;
        }

        *live = draft;
        Ok(output)
    }

    /// Switch the academic year scope. The new year's collections are loaded (or
    /// started empty) and `op` runs against them before anything is persisted.
    pub async fn switch_year<T, E, F>(&self, year: &str, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut Directory) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut live = self.inner.directory.lock().await;
        let collections = self.inner.backend.load_year(year).await?.unwrap_or_default();
        let mut settings = live.settings.clone();
        settings.academic_year = year.to_string();
        let mut draft = Directory::new(settings, collections);
        let output = op(&mut draft)?;

        self.inner
            .backend
            .save_year(&draft.settings.academic_year, &draft.collections)
            .await?;
        self.inner.backend.save_settings(&draft.settings).await?;

        info!("Switched academic year to {year:?}");
        *live = draft;
        Ok(output)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Store {
    type Error = ();

    /// Get the store from managed state.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        req.guard::<&State<Store>>()
            .await
            .map(|store| store.inner().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::directory::Collections;

    /// A backend that refuses every write.
    struct ReadOnlyBackend;

    #[rocket::async_trait]
    impl Backend for ReadOnlyBackend {
        async fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
            Ok(Some(Settings::new("2024")))
        }

        async fn save_settings(&self, _settings: &Settings) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        async fn load_year(&self, _year: &str) -> Result<Option<Collections>, StoreError> {
            Ok(None)
        }

        async fn save_year(&self, _year: &str, _data: &Collections) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[rocket::async_test]
    async fn failed_operation_leaves_state_untouched() {
        let store = Store::in_memory("2024").await.unwrap();
        let result: Result<(), Error> = store
            .write(|dir| {
                dir.classes.push("Form 1".to_string());
                Err(Error::validation("changed my mind"))
            })
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(store.read(|dir| dir.classes.is_empty()).await);
    }

    #[rocket::async_test]
    async fn failed_persist_leaves_state_untouched() {
        let store = Store::open(ReadOnlyBackend, "2024").await.unwrap();
        let result: Result<(), Error> = store
            .write(|dir| {
                dir.dorms.push("Kilimanjaro".to_string());
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(Error::Store(StoreError::Io(_)))));
        assert!(store.read(|dir| dir.dorms.is_empty()).await);
    }

    #[rocket::async_test]
    async fn years_are_isolated() {
        let store = Store::in_memory("2024").await.unwrap();
        store
            .write(|dir| -> Result<(), Error> {
                dir.classes.push("Form 1".to_string());
                Ok(())
            })
            .await
            .unwrap();

        store
            .switch_year("2025", |_| -> Result<(), Error> { Ok(()) })
            .await
            .unwrap();
        assert_eq!(store.read(|dir| dir.settings.academic_year.clone()).await, "2025");
        assert!(store.read(|dir| dir.classes.is_empty()).await);

        store
            .switch_year("2024", |_| -> Result<(), Error> { Ok(()) })
            .await
            .unwrap();
        assert_eq!(store.read(|dir| dir.classes.clone()).await, vec!["Form 1"]);
    }
}
