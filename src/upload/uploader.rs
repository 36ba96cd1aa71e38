use crate::client::WorkApi;
use crate::error::Result;
use crate::upload::types::{SelectedFile, UploadReply, UploadResult, WorkId};
use std::sync::Arc;

/// Posts a validated file and classifies the answer.
pub struct Uploader<A: WorkApi> {
    api: Arc<A>,
}

impl<A: WorkApi> Clone for Uploader<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: WorkApi> Uploader<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn submit(&self, file: &SelectedFile) -> UploadResult {
        tracing::info!(file = %file.name, size = file.size, "uploading file");
        let result = Self::interpret(self.api.upload(file).await);

        match &result {
            UploadResult::Accepted { work_id, .. } => {
                tracing::info!(file = %file.name, work_id = %work_id, "upload accepted")
            }
            UploadResult::Stored(body) => {
                tracing::info!(file = %file.name, saved_to = ?body.saved_to, "upload stored without work item")
            }
            UploadResult::ApplicationError(body) => {
                tracing::warn!(file = %file.name, error = %body.error_text(), "upload rejected by server")
            }
            UploadResult::NetworkError(message) => {
                tracing::warn!(file = %file.name, error = %message, "upload transport failure")
            }
        }
        result
    }

    /// Transport errors and server rejections stay distinct: only the latter carry a body.
    pub fn interpret(reply: Result<UploadReply>) -> UploadResult {
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => return UploadResult::NetworkError(e.to_string()),
        };

        if !reply.is_http_success() || !reply.body.ok {
            return UploadResult::ApplicationError(reply.body);
        }

        match reply.body.work_id.clone().filter(|id| !id.is_empty()) {
            Some(id) => UploadResult::Accepted {
                work_id: WorkId::new(id),
                response: reply.body,
            },
            None => UploadResult::Stored(reply.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn reply(status: u16, body: serde_json::Value) -> Result<UploadReply> {
        Ok(UploadReply {
            status,
            body: serde_json::from_value(body).unwrap(),
        })
    }

    #[test]
    fn ok_with_work_id_is_accepted() {
        let result = Uploader::<crate::client::HttpWorkApi>::interpret(reply(
            200,
            json!({"ok": true, "work_id": "abc123", "filename": "data.csv"}),
        ));
        match result {
            UploadResult::Accepted { work_id, response } => {
                assert_eq!(work_id.as_str(), "abc123");
                assert_eq!(response.filename.as_deref(), Some("data.csv"));
            }
            other => panic!("expected Accepted, got {other:?}"),
        }
    }

    #[test]
    fn ok_false_is_application_error_even_on_200() {
        let result = Uploader::<crate::client::HttpWorkApi>::interpret(reply(
            200,
            json!({"ok": false, "error": "Validación fallida", "details": {"errors": ["x"]}}),
        ));
        match result {
            UploadResult::ApplicationError(body) => {
                assert_eq!(body.error_text(), "Validación fallida");
                assert_eq!(body.details, Some(json!({"errors": ["x"]})));
            }
            other => panic!("expected ApplicationError, got {other:?}"),
        }
    }

    #[test]
    fn http_failure_wins_over_ok_true() {
        let result = Uploader::<crate::client::HttpWorkApi>::interpret(reply(
            500,
            json!({"ok": true, "work_id": "abc123"}),
        ));
        assert!(matches!(result, UploadResult::ApplicationError(_)));
    }

    #[test]
    fn ok_without_work_id_is_stored() {
        let result = Uploader::<crate::client::HttpWorkApi>::interpret(reply(
            200,
            json!({"ok": true, "filename": "data.csv", "saved_to": "app/uploads/data.csv"}),
        ));
        match result {
            UploadResult::Stored(body) => {
                assert!(body.ok);
                assert_eq!(body.saved_to.as_deref(), Some("app/uploads/data.csv"));
            }
            other => panic!("expected Stored, got {other:?}"),
        }

        let result = Uploader::<crate::client::HttpWorkApi>::interpret(reply(
            201,
            json!({"ok": true, "work_id": ""}),
        ));
        assert!(matches!(result, UploadResult::Stored(_)));
    }

    #[test]
    fn transport_error_is_network_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let result = Uploader::<crate::client::HttpWorkApi>::interpret(Err(Error::Io(io)));
        match result {
            UploadResult::NetworkError(message) => assert!(message.contains("refused")),
            other => panic!("expected NetworkError, got {other:?}"),
        }
    }
}
