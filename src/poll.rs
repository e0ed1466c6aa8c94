//! Bounded status polling for submitted jobs.
//!
//! The loop issues at most `max_attempts` status fetches with a fixed wait
//! between them. Both the wait and the fetch are injected so the bound can be
//! exercised without a clock or a network.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::backend::{ClientError, GenerationClient, Job, JobStatus, StatusResponse};
use crate::sink::StatusSink;

/// Default number of status fetches before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default wait between status fetches (1 second).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Something that can wait for a duration.
pub trait Delay {
    fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real wall-clock waits on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Something that can report the current status of a job.
pub trait StatusSource {
    fn fetch_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;
}

impl StatusSource for GenerationClient {
    fn fetch_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send {
        self.status(job_id)
    }
}

/// How the poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded { video_url: Option<String> },
    Failed { error: Option<String> },
    /// The attempt bound ran out before a terminal status was seen.
    TimedOut { attempts: u32 },
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { video_url: Some(url) } => write!(f, "succeeded: {}", url),
            Self::Succeeded { video_url: None } => write!(f, "succeeded (no video URL)"),
            Self::Failed { error: Some(error) } => write!(f, "failed: {}", error),
            Self::Failed { error: None } => write!(f, "failed"),
            Self::TimedOut { attempts } => write!(f, "timed out after {} attempts", attempts),
        }
    }
}

/// Poll loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Runs the bounded poll loop.
#[derive(Debug, Clone)]
pub struct Poller<D = TokioDelay> {
    config: PollConfig,
    delay: D,
}

impl Poller<TokioDelay> {
    /// Poller with the default 60 × 1s bound on the tokio timer.
    pub fn new(config: PollConfig) -> Self {
        Self::with_delay(config, TokioDelay)
    }
}

impl Default for Poller<TokioDelay> {
    fn default() -> Self {
        Self::new(PollConfig::default())
    }
}

impl<D: Delay> Poller<D> {
    /// Poller with a custom delay source. `max_attempts` is raised to at least 1.
    pub fn with_delay(config: PollConfig, delay: D) -> Self {
        Self {
            config: PollConfig {
                max_attempts: config.max_attempts.max(1),
                ..config
            },
            delay,
        }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Poll `job` until it succeeds, fails, or the attempt bound runs out.
    ///
    /// Each fetch updates `job` and reports the raw status string to `sink`.
    /// There is exactly one wait between consecutive fetches and none after
    /// the last one.
    ///
    /// # Errors
    ///
    /// A failed status fetch aborts the loop and is returned as-is.
    pub async fn poll<S, K>(
        &self,
        source: &S,
        sink: &K,
        job: &mut Job,
    ) -> Result<PollOutcome, ClientError>
    where
        S: StatusSource + ?Sized,
        K: StatusSink + ?Sized,
    {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                self.delay.wait(self.config.interval).await;
            }

            let response = source.fetch_status(&job.id).await?;
            job.apply(&response);
            sink.report(&response.status);

            log::debug!(
                "Poll {}/{} for job {}: {}",
                attempt,
                max_attempts,
                job.id,
                response.status
            );

            match job.status {
                JobStatus::Succeeded => {
                    log::info!("Job {} succeeded after {} polls", job.id, attempt);
                    return Ok(PollOutcome::Succeeded {
                        video_url: job.result_url.clone(),
                    });
                }
                JobStatus::Failed => {
                    log::warn!("Job {} failed: {:?}", job.id, job.error_message);
                    return Ok(PollOutcome::Failed {
                        error: job.error_message.clone(),
                    });
                }
                _ => {}
            }
        }

        log::warn!(
            "Job {} still {} after {} polls, giving up",
            job.id,
            job.status,
            max_attempts
        );
        Ok(PollOutcome::TimedOut {
            attempts: max_attempts,
        })
    }
}
