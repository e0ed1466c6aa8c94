//! A single-job generation session.
//!
//! The session ties the backend client, the poll loop and a status sink
//! together and owns the one job being tracked. Submitting takes `&mut self`,
//! so a second job cannot start while the first is still being polled.

use crate::backend::{
    ClientError, FormInput, GenerationClient, GenerationRequest, Job, JobStatus, Submission,
};
use crate::poll::{Delay, PollOutcome, Poller, TokioDelay};
use crate::sink::{StatusSink, TriggerGuard};

/// End state of [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A video is ready (synchronously or after polling).
    Completed { video_url: Option<String> },
    /// The backend reported the job as failed.
    Failed { error: Option<String> },
    /// Polling ran out of attempts. Not a backend failure.
    TimedOut { attempts: u32 },
    /// The backend accepted the request but returned nothing to track.
    Acknowledged { message: Option<String> },
}

impl From<PollOutcome> for RunOutcome {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Succeeded { video_url } => Self::Completed { video_url },
            PollOutcome::Failed { error } => Self::Failed { error },
            PollOutcome::TimedOut { attempts } => Self::TimedOut { attempts },
        }
    }
}

impl RunOutcome {
    /// True for anything except a failure or a timeout.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Acknowledged { .. })
    }
}

pub struct Session<K, D = TokioDelay> {
    client: GenerationClient,
    poller: Poller<D>,
    sink: K,
    current: Option<Job>,
}

impl<K: StatusSink> Session<K, TokioDelay> {
    /// Session with the default poll bound.
    pub fn new(client: GenerationClient, sink: K) -> Self {
        Self::with_poller(client, Poller::default(), sink)
    }
}

impl<K: StatusSink, D: Delay> Session<K, D> {
    pub fn with_poller(client: GenerationClient, poller: Poller<D>, sink: K) -> Self {
        Self {
            client,
            poller,
            sink,
            current: None,
        }
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The job currently being tracked, if any.
    pub fn current_job(&self) -> Option<&Job> {
        self.current.as_ref()
    }

    /// Report backend liveness to the sink. Purely informational.
    pub async fn health_check(&self) -> String {
        let text = self.client.health_check().await;
        self.sink.report(&text);
        text
    }

    /// Validate and submit a form without polling.
    ///
    /// The trigger is disabled for the duration of the request and re-enabled
    /// on every exit path. A queued job replaces whatever was tracked before.
    pub async fn submit(&mut self, form: &FormInput) -> Result<Submission, ClientError> {
        let request = self.validate(form)?;
        let _guard = TriggerGuard::new(&self.sink);
        self.current = None;

        let submission = submit_request(&self.client, &self.sink, &request).await?;
        if let Submission::Queued(job) = &submission {
            self.current = Some(job.clone());
        }
        Ok(submission)
    }

    /// Submit a form and follow the job to a terminal state.
    ///
    /// The trigger stays disabled until the job succeeds, fails, or polling
    /// times out.
    pub async fn run(&mut self, form: &FormInput) -> Result<RunOutcome, ClientError> {
        let request = self.validate(form)?;
        let _guard = TriggerGuard::new(&self.sink);
        self.current = None;

        let outcome = match submit_request(&self.client, &self.sink, &request).await? {
            Submission::Queued(job) => {
                let job = self.current.insert(job);
                poll_job(&self.poller, &self.client, &self.sink, job).await?
            }
            Submission::Completed { video_url } => RunOutcome::Completed {
                video_url: Some(video_url),
            },
            Submission::Acknowledged { message, .. } => RunOutcome::Acknowledged { message },
        };
        Ok(outcome)
    }

    /// Start tracking an existing job id and poll it to a terminal state.
    pub async fn track(&mut self, job_id: &str) -> Result<RunOutcome, ClientError> {
        let _guard = TriggerGuard::new(&self.sink);
        let job = self.current.insert(Job::new(job_id, JobStatus::Queued));
        poll_job(&self.poller, &self.client, &self.sink, job).await
    }

    fn validate(&self, form: &FormInput) -> Result<GenerationRequest, ClientError> {
        GenerationRequest::from_form(form).map_err(|e| {
            self.sink.alert(&e.user_message());
            e
        })
    }
}

async fn submit_request<K: StatusSink>(
    client: &GenerationClient,
    sink: &K,
    request: &GenerationRequest,
) -> Result<Submission, ClientError> {
    sink.report("Working…");

    let submission = match client.submit(request).await {
        Ok(submission) => submission,
        Err(e) => {
            log::error!("Request failed: {}", e);
            sink.alert(&e.user_message());
            return Err(e);
        }
    };

    match &submission {
        Submission::Queued(job) => sink.report(&format!("Job {} {}", job.id, job.status)),
        Submission::Completed { video_url } => sink.report(&format!("Video ready: {}", video_url)),
        Submission::Acknowledged { message, .. } => sink.report(
            message
                .as_deref()
                .unwrap_or("Request accepted, no video yet"),
        ),
    }
    Ok(submission)
}

async fn poll_job<K: StatusSink, D: Delay>(
    poller: &Poller<D>,
    client: &GenerationClient,
    sink: &K,
    job: &mut Job,
) -> Result<RunOutcome, ClientError> {
    let outcome = match poller.poll(client, sink, job).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Polling job {} failed: {}", job.id, e);
            sink.alert(&e.user_message());
            return Err(e);
        }
    };

    match &outcome {
        PollOutcome::Succeeded { video_url: Some(url) } => {
            sink.report(&format!("Video ready: {}", url))
        }
        PollOutcome::Succeeded { video_url: None } => {
            sink.report("Job succeeded but returned no video URL")
        }
        PollOutcome::Failed { error } => sink.alert(&format!(
            "Generation failed: {}",
            error.as_deref().unwrap_or("unknown error")
        )),
        PollOutcome::TimedOut { attempts } => sink.report(&format!(
            "Timed out waiting for job {} after {} attempts",
            job.id, attempts
        )),
    }
    Ok(outcome.into())
}
