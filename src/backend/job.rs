//! Job records and the response bodies of `/generate` and `/status/{id}`.

use std::fmt;

use serde::Deserialize;

/// Status of a tracked job as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted, waiting for a worker.
    Queued,
    /// Being rendered.
    Running,
    /// Finished with a result.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Anything the client does not recognize; keeps the raw text.
    Unknown(String),
}

impl JobStatus {
    /// Map a raw backend status string. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "queued" | "pending" | "in_queue" => Self::Queued,
            "running" | "processing" | "in_progress" => Self::Running,
            "succeeded" | "completed" => Self::Succeeded,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// A backend job tracked by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Set only while `status` is `Succeeded`.
    pub result_url: Option<String>,
    /// Set only while `status` is `Failed`.
    pub error_message: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            result_url: None,
            error_message: None,
        }
    }

    /// Fold a status response into this job.
    pub fn apply(&mut self, response: &StatusResponse) {
        self.status = JobStatus::parse(&response.status);
        self.result_url = match self.status {
            JobStatus::Succeeded => response.video_url.clone(),
            _ => None,
        };
        self.error_message = match self.status {
            JobStatus::Failed => response.error.clone(),
            _ => None,
        };
    }
}

/// Body of `GET /status/{job_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Raw status text, e.g. `"running"`.
    pub status: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a successful `POST /generate`.
///
/// The backend either hands back a `job_id` to poll, a finished `video_url`,
/// or a bare acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl SubmitResponse {
    /// True when a 2xx body nonetheless reports an application error.
    pub fn is_error(&self) -> bool {
        if self.job_id.is_some() {
            return false;
        }
        self.error.is_some()
            || self.detail.is_some()
            || matches!(
                self.status.as_deref().map(JobStatus::parse),
                Some(JobStatus::Failed)
            )
    }

    /// Human-readable error text carried by the body, if any.
    ///
    /// FastAPI-style `detail` wins (structured details are rendered as JSON),
    /// then `message`, then `error`.
    pub fn error_text(&self) -> Option<String> {
        if let Some(detail) = &self.detail {
            return Some(match detail.as_str() {
                Some(text) => text.to_string(),
                None => detail.to_string(),
            });
        }
        self.message.clone().or_else(|| self.error.clone())
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A job to poll.
    Queued(Job),
    /// The backend finished synchronously.
    Completed { video_url: String },
    /// Accepted, but nothing to track.
    Acknowledged {
        status: Option<String>,
        message: Option<String>,
    },
}

impl From<SubmitResponse> for Submission {
    fn from(response: SubmitResponse) -> Self {
        if let Some(id) = response.job_id {
            let status = response
                .status
                .as_deref()
                .map(JobStatus::parse)
                .unwrap_or(JobStatus::Queued);
            let mut job = Job::new(id, status);
            if job.status == JobStatus::Succeeded {
                job.result_url = response.video_url;
            }
            return Self::Queued(job);
        }
        match response.video_url {
            Some(video_url) => Self::Completed { video_url },
            None => Self::Acknowledged {
                status: response.status,
                message: response.message,
            },
        }
    }
}
