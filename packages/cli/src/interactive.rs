//! Interactive hotspot explorer.
//!
//! Mirrors the dashboard controls in the terminal: pick a time window,
//! adjust the search radius or the minimum cluster size, and the pipeline
//! re-runs after every change.

use dialoguer::{Input, Select};
use hotspot_map_accident_models::TimeWindow;
use hotspot_map_cli_utils::{IndicatifProgress, MultiProgress};
use hotspot_map_hotspot::cache::RunSequencer;
use hotspot_map_hotspot::{Dashboard, HotspotError, HotspotRun};
use hotspot_map_hotspot_models::{
    HotspotQuery, MAX_MIN_SAMPLES, MAX_RADIUS_METERS, MIN_MIN_SAMPLES, MIN_RADIUS_METERS,
    RADIUS_STEP_METERS,
};
use hotspot_map_source::progress::null_progress;

use crate::render;

/// Explorer menu entries.
enum Action {
    TimeWindow,
    Radius,
    MinSamples,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[Self::TimeWindow, Self::Radius, Self::MinSamples, Self::Quit];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::TimeWindow => "Change time period",
            Self::Radius => "Change search radius",
            Self::MinSamples => "Change min accidents per cluster",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the explorer until the user quits.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or a prompt fails.
pub fn run(
    dashboard: &Dashboard,
    multi: &MultiProgress,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Accident Hotspot Explorer");
    if verbose {
        println!("{}", render::ABOUT);
    }
    println!();

    // Load up front so a bad path fails before the first prompt.
    let progress = IndicatifProgress::rows_spinner(multi, "Loading accidents");
    let dataset = dashboard.dataset(&progress)?;
    println!(
        "{} accidents loaded ({} rows dropped)",
        dataset.records.len(),
        dataset.report.rows_dropped
    );
    println!();

    let sequencer = RunSequencer::new();
    let mut query = dashboard.default_query();

    loop {
        let ticket = sequencer.begin();
        let result = dashboard.run(&query, &null_progress());
        if let Some(result) = sequencer.publish(ticket, result) {
            show(result, verbose);
        }

        let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
        let idx = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::TimeWindow => query.time_window = prompt_time_window(query.time_window)?,
            Action::Radius => query.params.radius_meters = prompt_radius(&query, verbose)?,
            Action::MinSamples => query.params.min_samples = prompt_min_samples(&query, verbose)?,
            Action::Quit => break,
        }
        println!();
    }

    Ok(())
}

fn show(result: Result<HotspotRun, HotspotError>, verbose: bool) {
    match result {
        Ok(run) => println!("{}", render::render_run(&run, verbose)),
        Err(e @ HotspotError::EmptyTimeWindow { .. }) => println!("❌ {e}\n"),
        Err(e) => println!("❌ Error: {e}\n"),
    }
}

fn prompt_time_window(current: TimeWindow) -> Result<TimeWindow, dialoguer::Error> {
    let windows = TimeWindow::all();
    let labels: Vec<&str> = windows.iter().map(|w| w.label()).collect();
    let default = windows.iter().position(|w| *w == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Select time period")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(windows[idx])
}

fn prompt_radius(query: &HotspotQuery, verbose: bool) -> Result<f64, dialoguer::Error> {
    let prompt = if verbose {
        format!(
            "Search radius in meters, {MIN_RADIUS_METERS}-{MAX_RADIUS_METERS} in steps of \
             {RADIUS_STEP_METERS} ({})",
            render::RADIUS_HELP
        )
    } else {
        format!("Search radius (m, {MIN_RADIUS_METERS}-{MAX_RADIUS_METERS})")
    };

    Input::<f64>::new()
        .with_prompt(prompt)
        .default(query.params.radius_meters)
        .validate_with(|value: &f64| -> Result<(), String> {
            if (MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(value) {
                Ok(())
            } else {
                Err(format!(
                    "Radius must be between {MIN_RADIUS_METERS} and {MAX_RADIUS_METERS} m"
                ))
            }
        })
        .interact_text()
}

fn prompt_min_samples(query: &HotspotQuery, verbose: bool) -> Result<usize, dialoguer::Error> {
    let prompt = if verbose {
        format!(
            "Min accidents per cluster, {MIN_MIN_SAMPLES}-{MAX_MIN_SAMPLES} ({})",
            render::MIN_SAMPLES_HELP
        )
    } else {
        format!("Min accidents per cluster ({MIN_MIN_SAMPLES}-{MAX_MIN_SAMPLES})")
    };

    Input::<usize>::new()
        .with_prompt(prompt)
        .default(query.params.min_samples)
        .validate_with(|value: &usize| -> Result<(), String> {
            if (MIN_MIN_SAMPLES..=MAX_MIN_SAMPLES).contains(value) {
                Ok(())
            } else {
                Err(format!(
                    "Min accidents must be between {MIN_MIN_SAMPLES} and {MAX_MIN_SAMPLES}"
                ))
            }
        })
        .interact_text()
}
