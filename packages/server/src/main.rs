#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the hotspot map API server.
//!
//! Reads `hotspot_map.toml` (or `HOTSPOT_MAP_CONFIG`), `ACCIDENTS_CSV`,
//! `BIND_ADDR` and `PORT`, then serves the API.

use hotspot_map_hotspot::Dashboard;
use hotspot_map_hotspot::config::DashboardConfig;
use hotspot_map_server::{BindConfig, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DashboardConfig::load()?;
    run_server(Dashboard::new(config), BindConfig::from_env()).await?;

    Ok(())
}
