//! HTTP access to the upload and status endpoints.
//!
//! The controller only talks to the server through [`WorkApi`], so tests can swap in an
//! in-memory implementation.

use crate::config::UploaderConfig;
use crate::error::Result;
use crate::tracking::StatusResponse;
use crate::upload::{SelectedFile, UploadReply, UploadResponse, WorkId};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

const DEFAULT_MIME: &str = "text/csv";

#[async_trait]
pub trait WorkApi: Send + Sync + 'static {
    /// Send the file as multipart field `file`. Non-2xx answers are returned, not raised.
    async fn upload(&self, file: &SelectedFile) -> Result<UploadReply>;

    /// Fetch the current state of a work item.
    async fn status(&self, work_id: &WorkId) -> Result<StatusResponse>;
}

#[derive(Clone, Debug)]
pub struct HttpWorkApi {
    client: Client,
    config: UploaderConfig,
}

impl HttpWorkApi {
    pub fn new(config: UploaderConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }
}

#[async_trait]
impl WorkApi for HttpWorkApi {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadReply> {
        let content = tokio::fs::read(&file.path).await?;
        let part = file_part(content, &file.name, file.mime.as_deref())?;
        let form = Form::new().part("file", part);

        let url = self.config.upload_url();
        tracing::debug!(url = %url, file = %file.name, size = file.size, "posting upload");

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body: UploadResponse = serde_json::from_str(&text)?;

        Ok(UploadReply { status, body })
    }

    async fn status(&self, work_id: &WorkId) -> Result<StatusResponse> {
        let url = self.config.status_url(work_id.as_str())?;
        let response = self.client.get(url).send().await?;
        let http_status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<StatusResponse>(&text) {
            Ok(body) => Ok(body),
            Err(_) if http_status == StatusCode::NOT_FOUND => Ok(StatusResponse::not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

fn file_part(content: Vec<u8>, name: &str, mime: Option<&str>) -> Result<Part> {
    let mime = match mime {
        Some(mime) if Part::text("").mime_str(mime).is_ok() => mime,
        Some(mime) => {
            // The reported type is advisory; an unparseable one is replaced.
            tracing::warn!(mime = %mime, "ignoring unparseable MIME type");
            DEFAULT_MIME
        }
        None => DEFAULT_MIME,
    };

    Ok(Part::bytes(content)
        .file_name(name.to_string())
        .mime_str(mime)?)
}
