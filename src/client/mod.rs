pub mod types;

use crate::error::{BatchError, BatchResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use types::*;

/// HTTP client for the batch download server
pub struct BatchClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl BatchClient {
    pub fn new(base_url: &str) -> BatchResult<Self> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> BatchResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_http_client(base_url, http_client)
    }

    pub fn with_http_client(base_url: &str, http_client: reqwest::Client) -> BatchResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BatchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BatchError::InvalidUrl(format!("{} cannot be a base URL", base_url)));
        }
        Ok(Self { base_url, http_client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Each segment is percent-encoded
    /// as a whole, so folder names never introduce extra path levels.
    fn endpoint(&self, segments: &[&str]) -> BatchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BatchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Submit a batch (`POST /start_download`)
    pub async fn start_download(&self, request: &BatchRequest) -> BatchResult<StartResponse> {
        let builder = self.http_client.post(self.endpoint(&["start_download"])?);
        let builder = match &request.cookie_file {
            Some(path) => builder.multipart(multipart_form(request, path).await?),
            None => builder.form(request),
        };
        let response = builder.send().await?;

        let response = ensure_success(response).await?;
        let body: StartResponse = decode(response).await?;

        if body.status != "started" {
            return Err(BatchError::UnexpectedResponse(
                body.message.unwrap_or_else(|| "Unknown response.".to_string()),
            ));
        }

        Ok(body)
    }

    /// Fetch one progress snapshot (`GET /get_progress`)
    pub async fn get_progress(&self) -> BatchResult<ProgressSnapshot> {
        let response = self.http_client
            .get(self.endpoint(&["get_progress"])?)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        decode(response).await
    }

    /// Ask the server to open a batch folder on its host
    pub async fn open_folder(&self, folder: &str) -> BatchResult<()> {
        let response = self.http_client
            .get(self.endpoint(&["open_folder", folder])?)
            .send()
            .await?;

        let status = response.status();
        let body: OpenFolderResponse = decode(response).await?;

        match body.status.as_deref() {
            Some("success") => Ok(()),
            _ => Err(BatchError::Server {
                status: status.as_u16(),
                message: body.error.unwrap_or_else(|| "Unknown error".to_string()),
            }),
        }
    }

    /// Archive URL of a batch folder. The archive is navigated to, not polled.
    pub fn download_zip_url(&self, folder: &str) -> BatchResult<Url> {
        self.endpoint(&["download_zip", folder])
    }

    /// Reset server-side batch state (`POST /clear_status`)
    pub async fn clear_status(&self) -> BatchResult<()> {
        let response = self.http_client
            .post(self.endpoint(&["clear_status"])?)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

/// Read the whole body and decode it, so malformed JSON surfaces as
/// `BatchError::Serialization` rather than a transport error.
async fn decode<T: DeserializeOwned>(response: Response) -> BatchResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Form fields plus the `cookie_file` part read from disk.
async fn multipart_form(request: &BatchRequest, cookie_file: &Path) -> BatchResult<Form> {
    let contents = tokio::fs::read(cookie_file).await?;
    let file_name = cookie_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("cookies.txt")
        .to_string();

    let form = request
        .form_fields()?
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    Ok(form.part("cookie_file", Part::bytes(contents).file_name(file_name)))
}

/// Turn non-2xx responses into `BatchError::Server`, preferring the body's
/// `message` field.
async fn ensure_success(response: Response) -> BatchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = decode::<ErrorBody>(response).await.unwrap_or_default();
    let message = body.message.unwrap_or_else(|| {
        format!(
            "Server error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    });

    Err(BatchError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Where the poller gets its snapshots from
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn fetch_progress(&self) -> BatchResult<ProgressSnapshot>;

    async fn clear_status(&self) -> BatchResult<()>;
}

#[async_trait]
impl ProgressSource for BatchClient {
    async fn fetch_progress(&self) -> BatchResult<ProgressSnapshot> {
        self.get_progress().await
    }

    async fn clear_status(&self) -> BatchResult<()> {
        BatchClient::clear_status(self).await
    }
}
