use crate::upload::types::{SelectedFile, ValidationOutcome};
use tokio::io::AsyncReadExt;

pub const REJECT_EXTENSION: &str = "El nombre de archivo debe terminar en .csv";
pub const REJECT_NO_DELIMITER: &str =
    "No se detectó un separador común (, ; o tab). Revisa tu archivo.";
pub const REJECT_UNREADABLE: &str = "No se pudo leer el archivo en el navegador.";

const DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Client-side checks run before a file may be submitted.
#[derive(Clone, Debug)]
pub struct Validator {
    sniff_bytes: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(8192)
    }
}

impl Validator {
    pub fn new(sniff_bytes: usize) -> Self {
        Self { sniff_bytes }
    }

    /// Name check, MIME advisory, then content sniff. Stops at the first rejection.
    pub async fn validate(&self, file: &SelectedFile) -> ValidationOutcome {
        if let ValidationOutcome::Rejected(reason) = Self::check_name(&file.name) {
            tracing::info!(file = %file.name, "rejected by name check");
            return ValidationOutcome::Rejected(reason);
        }

        Self::check_mime(file.mime.as_deref());

        let outcome = match self.read_sample(file).await {
            Ok(sample) => Self::sniff(&sample),
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "could not read file sample");
                ValidationOutcome::Rejected(REJECT_UNREADABLE.to_string())
            }
        };

        if let ValidationOutcome::Rejected(reason) = &outcome {
            tracing::info!(file = %file.name, reason = %reason, "rejected by content sniff");
        }
        outcome
    }

    pub fn check_name(name: &str) -> ValidationOutcome {
        if name.to_lowercase().ends_with(".csv") {
            ValidationOutcome::Accepted
        } else {
            ValidationOutcome::Rejected(REJECT_EXTENSION.to_string())
        }
    }

    /// Returns false for a suspicious type. Never rejects.
    pub fn check_mime(mime: Option<&str>) -> bool {
        match mime {
            Some(mime) if !(mime.starts_with("text/") || mime.contains("csv")) => {
                tracing::warn!(mime = %mime, "suspicious MIME type");
                false
            }
            _ => true,
        }
    }

    pub fn sniff(sample: &str) -> ValidationOutcome {
        if sample.contains(&DELIMITERS[..]) {
            ValidationOutcome::Accepted
        } else {
            ValidationOutcome::Rejected(REJECT_NO_DELIMITER.to_string())
        }
    }

    async fn read_sample(&self, file: &SelectedFile) -> std::io::Result<String> {
        let handle = tokio::fs::File::open(&file.path).await?;
        let mut buffer = Vec::with_capacity(self.sniff_bytes);
        handle
            .take(self.sniff_bytes as u64)
            .read_to_end(&mut buffer)
            .await?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
