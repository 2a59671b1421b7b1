use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use sync_logging::sync_info;
use tasksync_core::TaskId;
use thiserror::Error;
use url::Url;

use crate::{SettingsError, SyncSettings};

const PDF_MIME: &str = "application/pdf";

/// Task created by the backend for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedTask {
    pub task_id: TaskId,
    #[serde(default)]
    pub pdf_id: Option<u64>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] SettingsError),
    #[error("upload rejected with status {status}: {detail}")]
    HttpStatus { status: u16, detail: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Turns a document into a server-side task id.
#[async_trait::async_trait]
pub trait TaskIssuer: Send + Sync {
    async fn issue(&self, job_id: u64, file: &Path, token: &str)
        -> Result<IssuedTask, UploadError>;
}

/// Multipart upload to `{api_base}/api/v1/upload-pdf/`.
#[derive(Debug, Clone)]
pub struct ReqwestTaskIssuer {
    client: reqwest::Client,
    endpoint: Url,
}

impl ReqwestTaskIssuer {
    pub fn new(settings: &SyncSettings) -> Result<Self, UploadError> {
        let endpoint = settings.api_url(&["api", "v1", "upload-pdf", ""])?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl TaskIssuer for ReqwestTaskIssuer {
    async fn issue(
        &self,
        job_id: u64,
        file: &Path,
        token: &str,
    ) -> Result<IssuedTask, UploadError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|source| UploadError::ReadFile {
                path: file.to_path_buf(),
                source,
            })?;
        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.pdf")
            .to_string();
        sync_info!(
            "Uploading {file_name} ({} bytes) for job {job_id}",
            bytes.len()
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(PDF_MIME)
            .map_err(map_reqwest_error)?;
        let form = Form::new()
            .text("job_id", job_id.to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
                detail: error_detail(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        let issued = response
            .json::<IssuedTask>()
            .await
            .map_err(|err| UploadError::InvalidResponse(err.to_string()))?;
        sync_info!("Backend issued task {}", issued.task_id);
        Ok(issued)
    }
}

/// The `detail` member of an error body, as plain text.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::Timeout;
    }
    UploadError::Network(err.to_string())
}
