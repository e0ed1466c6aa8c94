//! GenerationClient - handles communication with the video generation backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::stream::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;

use super::error::{ClientError, GENERATION_FAILED_MESSAGE};
use super::job::{StatusResponse, SubmitResponse, Submission};
use super::request::{validate_prompt, GenerationRequest};

/// Default timeout for HTTP requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pull a human-readable message out of an error body.
fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<SubmitResponse>(body)
        .ok()?
        .error_text()
}

fn generic_failure(status: reqwest::StatusCode) -> String {
    format!(
        "Server error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

/// Client for the `/healthz`, `/generate` and `/status/{id}` endpoints.
pub struct GenerationClient {
    base_url: String,
    http_client: reqwest::Client,
    /// No total timeout; a video body can take longer than any API call.
    download_client: reqwest::Client,
}

impl GenerationClient {
    /// Create a client for the given base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        let download_client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            download_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ping the liveness endpoint and describe the result.
    ///
    /// Never fails; a dead backend produces a "failed" line instead.
    pub async fn health_check(&self) -> String {
        let url = format!("{}/healthz", self.base_url);
        match self.fetch_health(&url).await {
            Ok(body) => format!("Health: {}", body),
            Err(e) => {
                log::warn!("Health check against {} failed: {}", url, e);
                format!("Health check failed: {}", e)
            }
        }
    }

    async fn fetch_health(&self, url: &str) -> Result<serde_json::Value, ClientError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: generic_failure(status),
            });
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Submit a generation request.
    ///
    /// Sends a single `POST {base}/generate`. The prompt is validated first,
    /// so an empty prompt never reaches the network.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::EmptyPrompt` for a blank prompt,
    /// `ClientError::Api` for a non-2xx response or an error body,
    /// or `ClientError::Transport` if the request fails. A 2xx body that is
    /// not JSON counts as a bare acknowledgement.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<Submission, ClientError> {
        validate_prompt(&request.prompt)?;

        let url = format!("{}/generate", self.base_url);
        log::info!(
            "Sending /generate payload: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        log::debug!("Response ({}): {}", status, text);

        if !status.is_success() {
            let message = backend_message(&text).unwrap_or_else(|| generic_failure(status));
            log::warn!("Generation request rejected: {}", message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SubmitResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                if !text.trim().is_empty() {
                    log::warn!("Ignoring non-JSON /generate body: {}", e);
                }
                SubmitResponse::default()
            }
        };

        if body.is_error() {
            let message = body
                .error_text()
                .unwrap_or_else(|| GENERATION_FAILED_MESSAGE.to_string());
            log::warn!("Backend reported an error: {}", message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Submission::from(body))
    }

    /// Fetch the current status of a job.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the request fails, `ClientError::Api`
    /// for a non-2xx response, or `ClientError::InvalidResponse` when the body
    /// has no status.
    pub async fn status(&self, job_id: &str) -> Result<StatusResponse, ClientError> {
        let url = format!("{}/status/{}", self.base_url, job_id);

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: backend_message(&text).unwrap_or_else(|| generic_failure(status)),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Download a finished video to disk.
    ///
    /// Streams the body so large files are never held in memory. Parent
    /// directories of `dest` are created as needed. Only the connect timeout
    /// applies, and a failed transfer removes the partial file.
    pub async fn download_video(&self, url: &str, dest: &Path) -> Result<PathBuf, ClientError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.download_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("Video download failed: {}", generic_failure(status)),
            });
        }

        write_stream(response.bytes_stream(), dest).await?;
        Ok(dest.to_path_buf())
    }
}

/// Write a byte stream to `dest`, deleting the file if the stream fails.
async fn write_stream<S, B, E>(stream: S, dest: &Path) -> Result<(), ClientError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    ClientError: From<E>,
{
    let mut file = tokio::fs::File::create(dest).await?;
    let result = copy_stream(stream, &mut file).await;
    if result.is_err() {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(dest).await {
            log::warn!("Could not remove partial download {}: {}", dest.display(), e);
        }
    }
    result
}

async fn copy_stream<S, B, E>(stream: S, file: &mut tokio::fs::File) -> Result<(), ClientError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    ClientError: From<E>,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(chunk.as_ref()).await?;
    }

    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = GenerationClient::new("https://api.example.com///").unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_backend_message_prefers_detail() {
        let body = r#"{"detail": "prompt rejected", "message": "other"}"#;
        assert_eq!(backend_message(body).as_deref(), Some("prompt rejected"));
    }

    #[test]
    fn test_backend_message_renders_structured_detail() {
        let body = r#"{"detail": [{"loc": ["body", "prompt"], "msg": "field required"}]}"#;
        let message = backend_message(body).unwrap();
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_backend_message_falls_back_to_message_then_error() {
        assert_eq!(
            backend_message(r#"{"status": "error", "message": "boom"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(
            backend_message(r#"{"error": "bad model"}"#).as_deref(),
            Some("bad model")
        );
        assert_eq!(backend_message(r#"{"detail": null}"#), None);
        assert_eq!(backend_message("<html>502</html>"), None);
    }

    #[tokio::test]
    async fn test_write_stream_removes_partial_file_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("partial.mp4");
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"first chunk".to_vec()),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];

        let result = write_stream(futures_util::stream::iter(chunks), &dest).await;

        assert!(matches!(result, Err(ClientError::Io(_))));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_write_stream_keeps_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("whole.mp4");
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(b"ab".to_vec()), Ok(b"cd".to_vec())];

        write_stream(futures_util::stream::iter(chunks), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"abcd");
    }

    #[test]
    fn test_generic_failure_text() {
        assert_eq!(
            generic_failure(reqwest::StatusCode::BAD_GATEWAY),
            "Server error: 502 Bad Gateway"
        );
    }
}
