use csv_uploader::app::{CsvUploaderApp, SharedSurface};
use csv_uploader::{ControllerHandle, UploaderConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("csv_uploader=info")),
        )
        .init();

    let config = match UploaderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };

    let surface = SharedSurface::new();
    let controller = match ControllerHandle::spawn(config.clone(), Arc::new(surface.clone())) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!(error = %e, "could not start controller");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 650.0])
            .with_min_inner_size([400.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "CSV Uploader",
        options,
        Box::new(move |cc| Box::new(CsvUploaderApp::new(cc, config, surface, controller))),
    ) {
        tracing::error!(error = %e, "window closed with error");
    }
}
