use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rocket::{
    serde::json::serde_json,
    tokio::{fs, io::AsyncWriteExt},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::model::directory::{Collections, Settings};

use super::{Backend, StoreError};

const SETTINGS_FILE: &str = "settings.json";
const YEARS_DIR: &str = "years";

/// A backend storing JSON documents under a data directory:
///
/// ```text
/// <root>/settings.json
/// <root>/years/<academic year>.json
/// ```
///
/// Every save writes a sibling temporary file, syncs it, then renames it over the
/// target, so a crash mid-write leaves the previous document intact.
pub struct JsonFileBackend {
    root: PathBuf,
}

impl JsonFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Path of the collections document for a year. ASCII letters, digits and `-`
    /// are kept; every other byte becomes `_` plus two hex digits, so distinct
    /// years always get distinct files ("2024/2025" maps to `2024_2F2025.json`).
    pub fn year_path(&self, year: &str) -> PathBuf {
        let mut file_name = String::with_capacity(year.len());
        for byte in year.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                file_name.push(char::from(byte));
            } else {
                file_name.push_str(&format!("_{byte:02X}"));
            }
        }
        self.root.join(YEARS_DIR).join(format!("{file_name}.json"))
    }
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(document)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp_path).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(&tmp_path, path).await?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[rocket::async_trait]
impl Backend for JsonFileBackend {
    async fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        read_document(&self.settings_path()).await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        write_document(&self.settings_path(), settings).await
    }

    async fn load_year(&self, year: &str) -> Result<Option<Collections>, StoreError> {
        read_document(&self.year_path(year)).await
    }

    async fn save_year(&self, year: &str, collections: &Collections) -> Result<(), StoreError> {
        write_document(&self.year_path(year), collections).await
    }
}
