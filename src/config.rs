use std::path::{Path, PathBuf};

use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::error::Error;
use crate::model::store::{JsonFileBackend, Store};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    data_dir: PathBuf,
    auth_ttl: u32,
    default_academic_year: String,
    // secrets
    jwt_secret: String,
    default_admin_password: String,
}

impl Config {
    /// Directory holding the settings and per-year documents.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Academic year used when the store has never been opened before.
    pub fn default_academic_year(&self) -> &str {
        &self.default_academic_year
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Admin password installed when none has been set yet.
    pub fn default_admin_password(&self) -> &str {
        &self.default_admin_password
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that opens the JSON file store in the configured data directory,
/// makes sure an admin password exists, and places the [`Store`] into managed
/// state. Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Directory store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Config must be loaded before the store");
            return Err(rocket);
        };
        info!("Opening store in {}...", config.data_dir().display());

        let backend = JsonFileBackend::new(config.data_dir());
        let store = match Store::open(backend, config.default_academic_year()).await {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to open store: {e}");
                return Err(rocket);
            }
        };
        if let Err(e) = ensure_admin_password(&store, config.default_admin_password()).await {
            error!("Failed to set up admin password: {e}");
            return Err(rocket);
        }
        info!("...store online!");

        Ok(rocket.manage(store))
    }
}

/// Install the default admin password if none is set.
pub(crate) async fn ensure_admin_password(store: &Store, password: &str) -> Result<(), Error> {
    store
        .write(|dir| dir.ensure_admin_password(password))
        .await
}
