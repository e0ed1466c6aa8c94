//! vidgen-client library crate.
//!
//! Submits prompts to a remote video generation backend, polls the resulting
//! job with a fixed bound, and reports progress through a [`sink::StatusSink`].
//!
//! ```no_run
//! use vidgen_client::backend::{FormInput, GenerationClient};
//! use vidgen_client::session::Session;
//! use vidgen_client::sink::ConsoleSink;
//!
//! # async fn demo() -> Result<(), vidgen_client::backend::ClientError> {
//! let client = GenerationClient::new("http://127.0.0.1:8000")?;
//! let mut session = Session::new(client, ConsoleSink::new());
//! session.health_check().await;
//! let outcome = session.run(&FormInput::with_prompt("a lighthouse in a storm")).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod poll;
pub mod session;
pub mod sink;
