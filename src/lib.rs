#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;

/// Assemble the server: config, then the store, then routes and request logging.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
}

/// Build a rocket around an existing (in-memory) store, with a fixed test config.
#[cfg(test)]
pub(crate) async fn rocket_for_store(store: model::store::Store) -> Rocket<Build> {
    use model::admin::examples::EXAMPLE_PASSWORD;

    config::ensure_admin_password(&store, EXAMPLE_PASSWORD)
        .await
        .unwrap();

    let figment = rocket::Config::figment()
        .merge(("data_dir", std::env::temp_dir().join("school-election-unused")))
        .merge(("auth_ttl", 3600))
        .merge(("default_academic_year", "2024"))
        .merge(("jwt_secret", "test jwt secret"))
        .merge(("default_admin_password", EXAMPLE_PASSWORD));

    rocket::custom(figment)
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .manage(store)
}
