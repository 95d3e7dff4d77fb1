use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    error::ApiError,
    protocol::{
        CreateGradeCriteriaRequest, EventProposalRequest, GradeCriteria, Page, PageRequest,
        UploadFilesResponse,
    },
    util::is_image_file,
};
use thiserror::Error;
use tracing::{debug, error, info};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const UPLOAD_FIELD_NAME: &str = "files";

/// A file selected for upload, held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AttachmentUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("path has no usable file name: {}", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read attachment '{}'", path.display()))?;
        Ok(Self::new(filename, bytes))
    }

    pub fn is_image(&self) -> bool {
        is_image_file(&self.filename)
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{operation} failed with status {status}: {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },
    #[error("{operation} returned {returned} file urls for {expected} uploaded files")]
    UrlCountMismatch {
        operation: &'static str,
        expected: usize,
        returned: usize,
    },
}

#[async_trait]
pub trait FileUploadClient: Send + Sync {
    /// Uploads `files` and returns their URLs in the same order.
    async fn upload_files(&self, files: &[AttachmentUpload]) -> Result<Vec<String>>;
}

#[async_trait]
pub trait EventProposalClient: Send + Sync {
    async fn post_event_proposal(&self, proposal: &EventProposalRequest) -> Result<()>;
}

#[async_trait]
pub trait GradeCriteriaClient: Send + Sync {
    async fn list_grade_criteria(&self, page: PageRequest) -> Result<Page<GradeCriteria>>;
    async fn create_grade_criteria(
        &self,
        request: &CreateGradeCriteriaRequest,
    ) -> Result<GradeCriteria>;
}

/// REST client for the administration API.
#[derive(Clone)]
pub struct AdminApiClient {
    http: Client,
    api_endpoint: String,
}

impl AdminApiClient {
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), api_endpoint)
    }

    pub fn with_http_client(http: Client, api_endpoint: impl Into<String>) -> Self {
        let api_endpoint = api_endpoint.into().trim_end_matches('/').to_string();
        Self { http, api_endpoint }
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    async fn upload_files_impl(&self, files: &[AttachmentUpload]) -> Result<Vec<String>> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.filename.clone())
                .mime_str(file.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE))
                .with_context(|| format!("invalid mime type for '{}'", file.filename))?;
            form = form.part(UPLOAD_FIELD_NAME, part);
        }

        let response = self
            .http
            .post(format!("{}/files/upload", self.api_endpoint))
            .multipart(form)
            .send()
            .await?;
        let body: UploadFilesResponse = ensure_success("upload_files", response)
            .await?
            .json()
            .await?;

        if body.file_urls.len() != files.len() {
            return Err(RequestError::UrlCountMismatch {
                operation: "upload_files",
                expected: files.len(),
                returned: body.file_urls.len(),
            }
            .into());
        }
        Ok(body.file_urls)
    }

    async fn post_event_proposal_impl(&self, proposal: &EventProposalRequest) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/eventProposals", self.api_endpoint))
            .json(proposal)
            .send()
            .await?;
        ensure_success("post_event_proposal", response).await?;
        Ok(())
    }

    async fn list_grade_criteria_impl(&self, page: PageRequest) -> Result<Page<GradeCriteria>> {
        let response = self
            .http
            .get(format!("{}/gradeCriterias", self.api_endpoint))
            .query(&[("page", page.page), ("size", page.size)])
            .send()
            .await?;
        let page = ensure_success("list_grade_criteria", response)
            .await?
            .json()
            .await?;
        Ok(page)
    }

    async fn create_grade_criteria_impl(
        &self,
        request: &CreateGradeCriteriaRequest,
    ) -> Result<GradeCriteria> {
        let response = self
            .http
            .post(format!("{}/gradeCriterias", self.api_endpoint))
            .json(request)
            .send()
            .await?;
        let created = ensure_success("create_grade_criteria", response)
            .await?
            .json()
            .await?;
        Ok(created)
    }
}

async fn ensure_success(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match ApiError::from_body(&body) {
        Some(api_error) => api_error.message,
        None if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
        None => body,
    };
    Err(RequestError::Status {
        operation,
        status: status.as_u16(),
        message,
    }
    .into())
}

fn log_failure<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!(operation, error = %format!("{err:#}"), "admin api request failed");
    }
    result
}

#[async_trait]
impl FileUploadClient for AdminApiClient {
    async fn upload_files(&self, files: &[AttachmentUpload]) -> Result<Vec<String>> {
        if files.is_empty() {
            debug!("no attachments selected; skipping upload request");
            return Ok(Vec::new());
        }
        let urls = log_failure("upload_files", self.upload_files_impl(files).await)?;
        info!(count = urls.len(), "uploaded attachments");
        Ok(urls)
    }
}

#[async_trait]
impl EventProposalClient for AdminApiClient {
    async fn post_event_proposal(&self, proposal: &EventProposalRequest) -> Result<()> {
        log_failure(
            "post_event_proposal",
            self.post_event_proposal_impl(proposal).await,
        )
    }
}

#[async_trait]
impl GradeCriteriaClient for AdminApiClient {
    async fn list_grade_criteria(&self, page: PageRequest) -> Result<Page<GradeCriteria>> {
        log_failure(
            "list_grade_criteria",
            self.list_grade_criteria_impl(page).await,
        )
    }

    async fn create_grade_criteria(
        &self,
        request: &CreateGradeCriteriaRequest,
    ) -> Result<GradeCriteria> {
        log_failure(
            "create_grade_criteria",
            self.create_grade_criteria_impl(request).await,
        )
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
