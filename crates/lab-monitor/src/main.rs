mod bootstrap;
mod report;

use anyhow::{Context, Result};
use monitor_core::settings::Settings;
use monitor_core::synthetic::RandomSource;
use monitor_data::feeds::{
    process_device_feed, process_environment_feed, process_lab_feed, FeedSource, JsonFileFeed,
};
use monitor_data::reader::load_log_file;
use monitor_runtime::{Dashboard, DashboardView, JsonFileStore, RefreshOrchestrator};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Lab Monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Refresh: {}s",
        settings.view,
        settings.format,
        settings.refresh_rate
    );

    match settings.view.as_str() {
        "summary" => {
            let dashboard = load_dashboard(&settings)?;
            print_view(&settings, &dashboard.view())?;
        }

        "watch" => {
            tracing::info!("Starting auto-refresh loop...");
            let mut dashboard = load_dashboard(&settings)?;
            if dashboard.state().uploaded_content.is_none() {
                tracing::warn!("no log uploaded; pass --file to resimulate its sensors");
            } else if settings.auto_refresh_override().is_none() {
                dashboard.set_auto_refresh(true);
            }
            if !dashboard.state().auto_refresh {
                tracing::warn!("auto-refresh is off; only the current view will be shown");
            }

            let orchestrator = RefreshOrchestrator::from_secs(settings.refresh_rate);
            let (mut rx, handle) = orchestrator.start(dashboard);

            loop {
                tokio::select! {
                    update = rx.recv() => {
                        let Some(view) = update else { break };
                        print_view(&settings, &view)?;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Ctrl+C received; stopping refresh loop");
                        break;
                    }
                }
            }
            handle.abort();
        }

        "feed" => {
            let path = settings
                .feed_file
                .clone()
                .context("the feed view needs --feed-file")?;
            let mut feed = JsonFileFeed::new(path);
            if let Some(child) = &settings.feed_path {
                feed = feed.with_child(child.as_str());
            }
            let snapshot = feed.snapshot()?;

            match settings.feed_kind.as_str() {
                "lab" => {
                    let lab = process_lab_feed(snapshot.as_ref());
                    print_report(&settings, &lab, report::render_lab_feed)?;
                }
                "environment" => {
                    let env = process_environment_feed(snapshot.as_ref());
                    print_report(&settings, &env, report::render_environment_feed)?;
                }
                _ => {
                    let devices = process_device_feed(snapshot.as_ref())?;
                    print_report(&settings, &devices, report::render_device_feed)?;
                }
            }
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// Build the dashboard from the store, then apply `--file` and the
/// auto-refresh flags on top.
fn load_dashboard(settings: &Settings) -> Result<Dashboard<JsonFileStore, RandomSource>> {
    let store = JsonFileStore::open(settings.store_path());
    tracing::debug!(path = %store.path().display(), "opened store");

    let mut dashboard = Dashboard::new(store, RandomSource::new());
    if let Err(e) = dashboard.initialize() {
        tracing::warn!(error = %e, "stored log could not be restored");
    }

    if let Some(path) = &settings.file {
        let content = load_log_file(path)?;
        if let Err(e) = dashboard.upload(content) {
            eprintln!("Could not load {}: {}", path.display(), e);
        }
    }

    if let Some(enabled) = settings.auto_refresh_override() {
        dashboard.set_auto_refresh(enabled);
    }

    Ok(dashboard)
}

fn print_view(settings: &Settings, view: &DashboardView) -> Result<()> {
    print_report(settings, view, report::render_dashboard)
}

fn print_report<T: Serialize>(settings: &Settings, value: &T, render: fn(&T) -> String) -> Result<()> {
    if settings.format == "json" {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}
