use crate::surface::{ResultPanel, Tone, UploadSurface};
use crate::tracking::WorkStatus;
use crate::upload::{SelectedFile, WorkId};
use eframe::egui;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// What the tracking view shows for the current work item.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingState {
    pub work_id: WorkId,
    pub badge: Option<WorkStatus>,
    pub message: String,
    pub error: Option<String>,
    pub download_url: Option<String>,
}

impl TrackingState {
    fn new(work_id: WorkId) -> Self {
        Self {
            work_id,
            badge: None,
            message: "Consultando estado...".to_string(),
            error: None,
            download_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    pub status_line: String,
    pub status_tone: Tone,
    pub selection: Option<SelectedFile>,
    pub result: Option<ResultPanel>,
    pub tracking: Option<TrackingState>,
}

/// In-memory [`UploadSurface`] shared between the controller thread and the UI thread.
///
/// Every write requests a repaint once an egui context is attached.
#[derive(Clone, Default)]
pub struct SharedSurface {
    state: Arc<Mutex<SurfaceState>>,
    repaint: Arc<OnceLock<egui::Context>>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, ctx: egui::Context) {
        let _ = self.repaint.set(ctx);
    }

    pub fn snapshot(&self) -> SurfaceState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, apply: impl FnOnce(&mut SurfaceState)) {
        {
            let mut state = self.lock();
            apply(&mut *state);
        }
        if let Some(ctx) = self.repaint.get() {
            ctx.request_repaint();
        }
    }

    fn update_tracking(&self, apply: impl FnOnce(&mut TrackingState)) {
        self.update(|state| {
            if let Some(tracking) = state.tracking.as_mut() {
                apply(tracking);
            }
        });
    }
}

impl UploadSurface for SharedSurface {
    fn set_status_line(&self, text: &str, tone: Tone) {
        self.update(|state| {
            state.status_line = text.to_string();
            state.status_tone = tone;
        });
    }

    fn set_selection(&self, file: Option<&SelectedFile>) {
        self.update(|state| state.selection = file.cloned());
    }

    fn set_result(&self, panel: Option<ResultPanel>) {
        self.update(|state| state.result = panel);
    }

    fn show_tracking(&self, work_id: &WorkId) {
        self.update(|state| state.tracking = Some(TrackingState::new(work_id.clone())));
    }

    fn set_badge(&self, status: &WorkStatus) {
        self.update_tracking(|tracking| tracking.badge = Some(status.clone()));
    }

    fn set_message(&self, text: &str) {
        self.update_tracking(|tracking| tracking.message = text.to_string());
    }

    fn set_error(&self, error: Option<&str>) {
        self.update_tracking(|tracking| tracking.error = error.map(str::to_string));
    }

    fn set_download(&self, url: Option<&str>) {
        self.update_tracking(|tracking| tracking.download_url = url.map(str::to_string));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_writes_need_an_active_item() {
        let surface = SharedSurface::new();
        surface.set_message("ignored");
        assert!(surface.snapshot().tracking.is_none());

        surface.show_tracking(&WorkId::new("abc123"));
        surface.set_badge(&WorkStatus::Running);
        surface.set_download(Some("/files/abc123.csv"));

        let tracking = surface.snapshot().tracking.unwrap();
        assert_eq!(tracking.work_id.as_str(), "abc123");
        assert_eq!(tracking.badge, Some(WorkStatus::Running));
        assert_eq!(tracking.download_url.as_deref(), Some("/files/abc123.csv"));
    }

    #[test]
    fn new_tracking_item_resets_previous_fields() {
        let surface = SharedSurface::new();
        surface.show_tracking(&WorkId::new("first"));
        surface.set_error(Some("timeout"));

        surface.show_tracking(&WorkId::new("second"));
        let tracking = surface.snapshot().tracking.unwrap();
        assert_eq!(tracking.work_id.as_str(), "second");
        assert!(tracking.error.is_none());
        assert!(tracking.badge.is_none());
    }

    #[test]
    fn clones_share_state() {
        let surface = SharedSurface::new();
        let other = surface.clone();
        other.set_status_line("Subiendo...", Tone::Info);
        assert_eq!(surface.snapshot().status_line, "Subiendo...");
    }
}
