//! Video generation backend integration.
//!
//! This module talks to a remote generation service over three endpoints:
//! `GET /healthz`, `POST /generate` and `GET /status/{job_id}`. The service
//! itself lives elsewhere; only the client side of the contract is here.

mod client;
mod error;
mod job;
mod request;

pub use client::{GenerationClient, DEFAULT_TIMEOUT};
pub use error::{
    ClientError, EMPTY_PROMPT_MESSAGE, GENERATION_FAILED_MESSAGE, UNREACHABLE_MESSAGE,
};
pub use job::{Job, JobStatus, StatusResponse, SubmitResponse, Submission};
pub use request::{
    validate_prompt, AspectRatio, FormInput, GenerationRequest, DEFAULT_DURATION_SECS,
    DEFAULT_MODEL,
};
