mod state;
mod ui;

use crate::config::UploaderConfig;
use crate::controller::{Command, ControllerHandle};
use crate::upload::WorkId;
use eframe::{egui, App};
use rfd::FileDialog;
pub use state::{SharedSurface, SurfaceState, TrackingState};

pub struct CsvUploaderApp {
    config: UploaderConfig,
    surface: SharedSurface,
    controller: ControllerHandle,
    work_id_input: String,
    show_details: bool,
}

impl CsvUploaderApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: UploaderConfig,
        surface: SharedSurface,
        controller: ControllerHandle,
    ) -> Self {
        tracing::info!(base_url = %config.base_url, "initializing CSV uploader window");
        surface.attach(cc.egui_ctx.clone());
        Self {
            config,
            surface,
            controller,
            work_id_input: String::new(),
            show_details: false,
        }
    }

    pub fn pick_file(&mut self) {
        if let Some(path) = FileDialog::new().pick_file() {
            tracing::debug!(path = %path.display(), "file picked");
            self.controller.send(Command::SelectPath { path, mime: None });
        }
    }

    /// Only the first dropped file is used.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };

        match file.path {
            Some(path) => {
                tracing::debug!(path = %path.display(), mime = %file.mime, "file dropped");
                let mime = Some(file.mime).filter(|m| !m.is_empty());
                self.controller.send(Command::SelectPath { path, mime });
            }
            None => tracing::warn!(name = %file.name, "dropped file has no path"),
        }
    }

    pub fn submit(&mut self) {
        self.controller.send(Command::Submit);
    }

    pub fn track_manual(&mut self) {
        let work_id = self.work_id_input.trim();
        if work_id.is_empty() {
            return;
        }
        self.controller.send(Command::Track(WorkId::new(work_id)));
    }

    pub fn stop_tracking(&mut self) {
        self.controller.send(Command::StopTracking);
    }

    pub fn open_download(&self, link: &str) {
        let url = self.config.resolve_url(link);
        tracing::info!(url = %url, "opening download");
        if let Err(e) = open::that(&url) {
            tracing::warn!(url = %url, error = %e, "could not open download link");
        }
    }
}

impl App for CsvUploaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        let snapshot = self.surface.snapshot();
        self.render(ctx, &snapshot);
    }
}
