//! Observation contract between the controller and whatever renders it.

use crate::tracking::WorkStatus;
use crate::upload::{SelectedFile, UploadResponse, WorkId};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Info,
    Error,
}

/// Content of the result panel under the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPanel {
    Success {
        filename: String,
        saved_to: Option<String>,
        validation: Option<String>,
        warning: Option<String>,
    },
    Error {
        message: String,
        details: Option<String>,
    },
}

impl ResultPanel {
    pub fn error(message: impl Into<String>) -> Self {
        ResultPanel::Error {
            message: message.into(),
            details: None,
        }
    }

    /// Error box for a server rejection, with `details` pretty-printed when present.
    pub fn rejected(body: &UploadResponse) -> Self {
        ResultPanel::Error {
            message: body.error_text(),
            details: body.details.as_ref().map(pretty),
        }
    }

    /// Success box for an accepted upload. `fallback_name` is used when the server omits it.
    pub fn accepted(body: &UploadResponse, fallback_name: &str) -> Self {
        ResultPanel::Success {
            filename: body
                .filename
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            saved_to: body.saved_to.clone(),
            validation: body.validation.as_ref().map(pretty),
            warning: body.warn.clone(),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// UI elements the controller and poller write to.
///
/// Implementations use interior mutability: poll sessions update the surface from their own task.
pub trait UploadSurface: Send + Sync {
    fn set_status_line(&self, text: &str, tone: Tone);

    /// File currently waiting to be submitted.
    fn set_selection(&self, file: Option<&SelectedFile>);

    fn set_result(&self, panel: Option<ResultPanel>);

    /// Switch to the tracking view for a work item, clearing any previous item's state.
    fn show_tracking(&self, work_id: &WorkId);

    fn set_badge(&self, status: &WorkStatus);

    fn set_message(&self, text: &str);

    fn set_error(&self, error: Option<&str>);

    fn set_download(&self, url: Option<&str>);
}
