//! Orchestrates selection, upload and tracking for one window.

use crate::client::{HttpWorkApi, WorkApi};
use crate::config::UploaderConfig;
use crate::error::{Error, Result};
use crate::surface::{ResultPanel, Tone, UploadSurface};
use crate::tracking::{PollSession, StatusPoller};
use crate::upload::{
    SelectedFile, UploadResult, Uploader, ValidationOutcome, Validator, WorkId, REJECT_UNREADABLE,
};
use crate::utils::file_size::FileSizeUtils;
use derivative::Derivative;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const STATUS_VALIDATING: &str = "Validando archivo (cliente)...";
pub const STATUS_NO_FILE: &str = "Selecciona un archivo antes de subir.";
pub const STATUS_UPLOADING: &str = "Subiendo...";
pub const STATUS_UPLOADED: &str = "Subida completa ✅";
pub const STATUS_UPLOAD_FAILED: &str = "Error al subir";
pub const STATUS_NETWORK_ERROR: &str = "Error de red al subir";
pub const TRACKING_STOPPED: &str = "Seguimiento detenido. El estado mostrado puede estar desactualizado.";

/// User input forwarded from the UI thread.
#[derive(Debug, Clone)]
pub enum Command {
    SelectFile(SelectedFile),
    /// A path from the picker or a drop; metadata is read by the controller.
    SelectPath {
        path: PathBuf,
        mime: Option<String>,
    },
    Submit,
    Track(WorkId),
    StopTracking,
}

#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Controller<A: WorkApi> {
    validator: Validator,
    #[derivative(Debug = "ignore")]
    uploader: Uploader<A>,
    poller: StatusPoller<A>,
    #[derivative(Debug = "ignore")]
    surface: Arc<dyn UploadSurface>,
    pending: Option<SelectedFile>,
    session: Option<PollSession>,
}

impl<A: WorkApi> Controller<A> {
    pub fn new(api: Arc<A>, surface: Arc<dyn UploadSurface>, config: &UploaderConfig) -> Self {
        Self {
            validator: Validator::new(config.sniff_bytes),
            uploader: Uploader::new(Arc::clone(&api)),
            poller: StatusPoller::new(
                api,
                Arc::clone(&surface),
                config.poll_interval(),
                config.max_consecutive_failures,
            )
            .with_query_timeout(config.status_timeout()),
            surface,
            pending: None,
            session: None,
        }
    }

    pub fn pending_file(&self) -> Option<&SelectedFile> {
        self.pending.as_ref()
    }

    /// The current poll session, if it has not ended yet.
    pub fn active_session(&self) -> Option<&PollSession> {
        self.session.as_ref().filter(|s| !s.is_finished())
    }

    pub async fn select_path(&mut self, path: PathBuf, mime: Option<String>) -> ValidationOutcome {
        match SelectedFile::from_path(&path, mime).await {
            Ok(file) => self.select_file(file).await,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not stat selected file");
                self.set_pending(None);
                self.reject(REJECT_UNREADABLE);
                ValidationOutcome::Rejected(REJECT_UNREADABLE.to_string())
            }
        }
    }

    /// Validate a new selection. Only an accepted file is kept for submission.
    pub async fn select_file(&mut self, file: SelectedFile) -> ValidationOutcome {
        self.surface.set_status_line(STATUS_VALIDATING, Tone::Info);

        let outcome = self.validator.validate(&file).await;
        match &outcome {
            ValidationOutcome::Accepted => {
                self.surface.set_status_line(
                    &format!(
                        "{} listo para subir ({} KB)",
                        file.name,
                        FileSizeUtils::kib_rounded(file.size)
                    ),
                    Tone::Info,
                );
                self.surface.set_result(None);
                tracing::info!(file = %file.name, size = file.size, "file ready for upload");
                self.set_pending(Some(file));
            }
            ValidationOutcome::Rejected(reason) => {
                self.set_pending(None);
                self.reject(reason);
            }
        }
        outcome
    }

    fn set_pending(&mut self, file: Option<SelectedFile>) {
        self.surface.set_selection(file.as_ref());
        self.pending = file;
    }

    fn reject(&self, reason: &str) {
        self.surface
            .set_status_line(&format!("Error: {}", reason), Tone::Error);
        self.surface.set_result(Some(ResultPanel::error(reason)));
    }

    /// Upload the pending file. Refused without a network call when nothing is pending.
    pub async fn submit(&mut self) -> Result<UploadResult> {
        let Some(file) = self.pending.clone() else {
            self.surface.set_status_line(STATUS_NO_FILE, Tone::Error);
            return Err(Error::NoFileSelected);
        };

        self.surface.set_status_line(STATUS_UPLOADING, Tone::Info);
        let result = self.uploader.submit(&file).await;

        match &result {
            UploadResult::Accepted { work_id, response } => {
                self.surface.set_status_line(STATUS_UPLOADED, Tone::Info);
                self.surface
                    .set_result(Some(ResultPanel::accepted(response, &file.name)));
                self.set_pending(None);
                self.track(work_id.clone());
            }
            UploadResult::Stored(response) => {
                self.surface.set_status_line(STATUS_UPLOADED, Tone::Info);
                self.surface
                    .set_result(Some(ResultPanel::accepted(response, &file.name)));
                self.set_pending(None);
            }
            UploadResult::ApplicationError(body) => {
                self.surface.set_status_line(STATUS_UPLOAD_FAILED, Tone::Error);
                self.surface.set_result(Some(ResultPanel::rejected(body)));
            }
            UploadResult::NetworkError(message) => {
                self.surface.set_status_line(STATUS_NETWORK_ERROR, Tone::Error);
                self.surface.set_result(Some(ResultPanel::error(message.clone())));
            }
        }
        Ok(result)
    }

    /// Follow `work_id`, stopping any session already running.
    pub fn track(&mut self, work_id: WorkId) {
        self.stop_tracking();
        self.session = Some(self.poller.start(work_id));
    }

    /// Stop polling. An interrupted session leaves a notice in the tracking view.
    pub fn stop_tracking(&mut self) {
        if let Some(previous) = self.session.take() {
            let interrupted = !previous.is_finished();
            previous.stop();
            if interrupted {
                self.surface.set_message(TRACKING_STOPPED);
            }
        }
    }

    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::SelectFile(file) => {
                self.select_file(file).await;
            }
            Command::SelectPath { path, mime } => {
                self.select_path(path, mime).await;
            }
            Command::Submit => {
                if let Err(e) = self.submit().await {
                    tracing::info!(error = %e, "submit refused");
                }
            }
            Command::Track(work_id) => self.track(work_id),
            Command::StopTracking => self.stop_tracking(),
        }
    }

    /// Process commands in arrival order until every sender is gone.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("controller started");
        while let Some(command) = commands.recv().await {
            tracing::debug!(?command, "handling command");
            self.handle(command).await;
        }
        self.stop_tracking();
        tracing::info!("controller stopped");
    }
}

/// Controller running on its own single-threaded runtime.
#[derive(Debug)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ControllerHandle {
    pub fn spawn(config: UploaderConfig, surface: Arc<dyn UploadSurface>) -> Result<Self> {
        let api = Arc::new(HttpWorkApi::new(config.clone())?);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(e.to_string()))?;
        let (commands, receiver) = mpsc::unbounded_channel();

        let thread = std::thread::Builder::new()
            .name("csv-uploader-controller".to_string())
            .spawn(move || {
                let controller = Controller::new(api, surface, &config);
                runtime.block_on(controller.run(receiver));
            })
            .map_err(|e| Error::Runtime(e.to_string()))?;

        Ok(Self {
            commands,
            thread: Some(thread),
        })
    }

    pub fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::error!("controller is no longer running");
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        // Closing the channel ends the controller loop.
        let (closed, _) = mpsc::unbounded_channel();
        self.commands = closed;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("controller thread panicked");
            }
        }
    }
}
