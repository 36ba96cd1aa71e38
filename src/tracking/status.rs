use serde::Deserialize;

/// Server-reported state of a work item.
///
/// Unexpected wire values land in `Unknown` so callers must handle them explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkStatus {
    Pending,
    Running,
    Completed,
    Failed,
    NotFound,
    Unknown(String),
}

impl WorkStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => WorkStatus::Pending,
            "running" => WorkStatus::Running,
            "completed" => WorkStatus::Completed,
            "failed" => WorkStatus::Failed,
            "not_found" => WorkStatus::NotFound,
            _ => WorkStatus::Unknown(raw.to_string()),
        }
    }

    /// No further transitions are expected once a terminal value is seen.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkStatus::Pending | WorkStatus::Running)
    }

    pub fn label(&self) -> &str {
        match self {
            WorkStatus::Pending => "pending",
            WorkStatus::Running => "running",
            WorkStatus::Completed => "completed",
            WorkStatus::Failed => "failed",
            WorkStatus::NotFound => "not_found",
            WorkStatus::Unknown(raw) => raw,
        }
    }

    /// Message shown next to the badge.
    pub fn message(&self) -> String {
        match self {
            WorkStatus::Pending => "En cola, se procesará pronto.".to_string(),
            WorkStatus::Running => "Procesando, puede tardar varios minutos.".to_string(),
            WorkStatus::Completed => {
                "Procesamiento completado. El resultado está listo para descargar.".to_string()
            }
            WorkStatus::Failed => "El procesamiento falló.".to_string(),
            WorkStatus::NotFound => "No se encontró ningún trabajo con ese work_id.".to_string(),
            WorkStatus::Unknown(raw) => format!("Estado desconocido recibido del servidor: {}", raw),
        }
    }
}

/// JSON body of `GET /api/status/{work_id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub work_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn work_status(&self) -> WorkStatus {
        WorkStatus::from_wire(&self.status)
    }

    pub fn not_found() -> Self {
        Self {
            status: "not_found".to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_map_case_insensitively() {
        assert_eq!(WorkStatus::from_wire("pending"), WorkStatus::Pending);
        assert_eq!(WorkStatus::from_wire("RUNNING"), WorkStatus::Running);
        assert_eq!(WorkStatus::from_wire("Completed"), WorkStatus::Completed);
        assert_eq!(WorkStatus::from_wire("failed"), WorkStatus::Failed);
        assert_eq!(WorkStatus::from_wire("not_found"), WorkStatus::NotFound);
        assert_eq!(
            WorkStatus::from_wire("cancelled"),
            WorkStatus::Unknown("cancelled".to_string())
        );
    }

    #[test]
    fn only_pending_and_running_keep_polling() {
        assert!(!WorkStatus::Pending.is_terminal());
        assert!(!WorkStatus::Running.is_terminal());
        assert!(WorkStatus::Completed.is_terminal());
        assert!(WorkStatus::Failed.is_terminal());
        assert!(WorkStatus::NotFound.is_terminal());
        assert!(WorkStatus::Unknown("in_progress".into()).is_terminal());
    }

    #[test]
    fn unknown_message_names_the_raw_value() {
        let msg = WorkStatus::Unknown("paused".into()).message();
        assert!(msg.contains("paused"));
    }

    #[test]
    fn status_body_decodes_with_optional_fields() {
        let body: StatusResponse = serde_json::from_str(
            r#"{"status":"completed","work_id":"w1","task_id":"t1","download_url":"/download/t1"}"#,
        )
        .unwrap();
        assert_eq!(body.work_status(), WorkStatus::Completed);
        assert_eq!(body.download_url.as_deref(), Some("/download/t1"));
        assert!(body.error.is_none());
    }
}
