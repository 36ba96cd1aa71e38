use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// File chosen through the picker or dropped on the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    /// MIME type reported by the source. Advisory only.
    pub mime: Option<String>,
    pub path: PathBuf,
}

impl SelectedFile {
    /// Describe a file on disk. The name is the final path component.
    pub async fn from_path(path: impl Into<PathBuf>, mime: Option<String>) -> std::io::Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            name,
            size,
            mime: mime.filter(|m| !m.is_empty()),
            path,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(String),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

/// Server handle for an asynchronous work item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkId(String);

impl WorkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON body of `POST /`.
///
/// Every field is optional so that error bodies (including FastAPI's `{"detail": ...}`)
/// decode into the same shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub work_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub saved_to: Option<String>,
    #[serde(default)]
    pub validation: Option<Value>,
    #[serde(default)]
    pub warn: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl UploadResponse {
    /// Human-readable failure text, falling back to "Error desconocido".
    pub fn error_text(&self) -> String {
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return error.to_string();
        }
        match &self.detail {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Error desconocido".to_string(),
        }
    }
}

/// Raw outcome of the upload request, before interpretation.
#[derive(Debug, Clone)]
pub struct UploadReply {
    pub status: u16,
    pub body: UploadResponse,
}

impl UploadReply {
    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Interpreted upload result.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    Accepted {
        work_id: WorkId,
        response: UploadResponse,
    },
    /// Saved by the server, but no work item was queued for it.
    Stored(UploadResponse),
    ApplicationError(UploadResponse),
    NetworkError(String),
}
