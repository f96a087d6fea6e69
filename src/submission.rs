use crate::client::types::{BatchRequest, StartResponse};
use crate::client::BatchClient;
use crate::error::{BatchError, BatchResult};

/// Number of non-blank lines in a URL list
pub fn count_urls(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

impl BatchRequest {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            urls,
            ..Default::default()
        }
    }

    pub fn url_count(&self) -> usize {
        count_urls(&self.urls)
    }

    /// Reject a batch with no URLs before anything is sent.
    pub fn validate(&self) -> BatchResult<()> {
        if self.urls.trim().is_empty() {
            return Err(BatchError::Validation(
                "Please enter at least one URL to download.".to_string(),
            ));
        }
        if self.parallel_downloads == Some(0) {
            return Err(BatchError::Validation(
                "Parallel downloads must be at least 1.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validate and post a batch. Only a `started` acknowledgement counts as
/// success.
pub async fn submit(client: &BatchClient, request: &BatchRequest) -> BatchResult<StartResponse> {
    request.validate()?;

    tracing::info!(
        urls = request.url_count(),
        folder = ?request.folder,
        cookies = request.cookie_file.is_some(),
        "Submitting batch"
    );
    let response = client.start_download(request).await?;
    tracing::info!(tasks = response.task_ids.len(), "Batch started");

    Ok(response)
}
