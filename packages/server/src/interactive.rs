//! Interactive mode for the server.
//!
//! Prompts for the dataset, bind address and port before starting the
//! server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use hotspot_map_hotspot::Dashboard;
use hotspot_map_hotspot::config::DashboardConfig;

use crate::BindConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Starts from `config` and the `BIND_ADDR`/`PORT` environment, lets the
/// user change the dataset path, bind address and port, then delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(config: DashboardConfig) -> std::io::Result<()> {
    println!("Hotspot Map Server");
    println!();

    let defaults = BindConfig::from_env();

    let dataset: String = Input::new()
        .with_prompt("Accident table")
        .default(config.dataset_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| config.dataset_path.display().to_string());

    let addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.addr.clone())
        .interact_text()
        .unwrap_or(defaults.addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let dashboard = Dashboard::new(config.with_dataset_override(Some(PathBuf::from(dataset))));
    super::run_server(dashboard, BindConfig { addr, port }).await
}
