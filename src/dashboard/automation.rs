use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::wizard::UserInputs;
use crate::client::{BackendClient, RequestBody};
use crate::error::Error;
use crate::types::JobStatus;

const PDF_MIME: &str = "application/pdf";

#[derive(Deserialize)]
struct PdfList {
    #[serde(default)]
    pdfs: Vec<String>,
}

#[derive(Deserialize)]
struct FloorList {
    #[serde(default)]
    floors: Vec<String>,
}

/// A building-code PDF picked by the user.
#[derive(Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PdfUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PdfUpload {
    fn is_pdf(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(PDF_MIME))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub status: JobStatus,
    /// Library contents re-read after the upload.
    pub pdfs: Vec<String>,
}

/// Automation jobs and the PDF library.
#[derive(Debug, Clone)]
pub struct Automation {
    backend: BackendClient,
}

impl Automation {
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// # Errors
    ///
    /// Any backend error.
    pub async fn run_grid(&self) -> Result<JobStatus, Error> {
        self.backend.post("/run/grid", &[], RequestBody::Empty).await
    }

    /// # Errors
    ///
    /// Any backend error.
    pub async fn run_paths(&self) -> Result<JobStatus, Error> {
        self.backend.post("/run/paths", &[], RequestBody::Empty).await
    }

    /// Runs the compliance check against an embedded code PDF.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when no PDF is selected; otherwise any backend error.
    pub async fn run_fls(&self, pdf_id: &str) -> Result<JobStatus, Error> {
        let pdf_id = pdf_id.trim();
        if pdf_id.is_empty() {
            return Err(Error::InvalidInput("select a code first".into()));
        }
        self.backend
            .post("/run/fls", &[("pdf_id", pdf_id)], RequestBody::Empty)
            .await
    }

    /// # Errors
    ///
    /// Any backend error.
    pub async fn list_pdfs(&self) -> Result<Vec<String>, Error> {
        let list: PdfList = self.backend.get("/fls/pdfs", &[]).await?;
        Ok(list.pdfs)
    }

    /// Uploads a PDF as multipart field `pdf`, then refreshes the library.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUpload`] for non-PDF files; otherwise any backend error.
    pub async fn upload_pdf(&self, upload: PdfUpload) -> Result<UploadOutcome, Error> {
        if !upload.is_pdf() {
            return Err(Error::InvalidUpload(format!(
                "{} is not a PDF ({})",
                upload.file_name, upload.content_type
            )));
        }

        tracing::info!(file = %upload.file_name, bytes = upload.bytes.len(), "Uploading code PDF");
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(PDF_MIME)?;
        let form = Form::new().part("pdf", part);

        let status: JobStatus = self
            .backend
            .post("/fls/upload", &[], RequestBody::Multipart(form))
            .await?;
        let pdfs = self.list_pdfs().await?;
        Ok(UploadOutcome { status, pdfs })
    }

    /// Floors that have a graph to compute paths on.
    ///
    /// # Errors
    ///
    /// [`Error::NoFloors`] when the backend lists none; otherwise any backend error.
    pub async fn floors(&self) -> Result<Vec<String>, Error> {
        let list: FloorList = self.backend.get("/graph/floors", &[]).await?;
        if list.floors.is_empty() {
            return Err(Error::NoFloors);
        }
        Ok(list.floors)
    }

    /// Saves the wizard payload, then runs path computation.
    ///
    /// # Errors
    ///
    /// Any backend error; the path job is not started if saving fails.
    pub async fn compute_paths(&self, inputs: &UserInputs) -> Result<JobStatus, Error> {
        let payload = serde_json::to_value(inputs)
            .map_err(|e| Error::InvalidInput(format!("user inputs: {e}")))?;
        let _ack: serde_json::Value = self
            .backend
            .post("/save-user-inputs", &[], RequestBody::Json(payload))
            .await?;
        self.run_paths().await
    }
}
