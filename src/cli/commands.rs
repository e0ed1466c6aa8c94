//! Subcommand handlers.

use std::path::{Path, PathBuf};

use super::args::{Args, Command, ConfigAction};
use crate::backend::{ClientError, GenerationClient, Submission, DEFAULT_TIMEOUT};
use crate::config::{default_path, BaseUrlSource, Config, ConfigError, BASE_URL_ENV};
use crate::poll::{Delay, PollConfig, Poller};
use crate::session::{RunOutcome, Session};
use crate::sink::{ConsoleSink, StatusSink};

const DEFAULT_CONFIG: &str = r#"# vidgen configuration

[backend]
# Generation backend (overridden by --base-url and VIDGEN_API_BASE)
# base_url = "http://127.0.0.1:8000"
# Per-request HTTP timeout in seconds
# request_timeout_secs = 30

[poll]
# Status checks before giving up on a job
max_attempts = 60
# Seconds between status checks
interval_secs = 1
"#;

/// Errors surfaced by subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// A client error the status sink has already shown.
    #[error(transparent)]
    Reported(ClientError),

    /// The job failed or timed out; the status sink has already said so.
    #[error("job did not complete: {0:?}")]
    Unfinished(RunOutcome),

    #[error("{0}")]
    Failed(String),
}

impl CliError {
    /// True when the user has already seen this error.
    pub fn already_reported(&self) -> bool {
        matches!(self, Self::Reported(_) | Self::Unfinished(_))
    }
}

/// Settings resolved from flags, environment and the config file.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub base_url: String,
    pub base_url_source: BaseUrlSource,
    pub quiet: bool,
}

impl Context {
    pub fn load(args: &Args) -> Result<Self, CliError> {
        let config_path = args.config.clone().unwrap_or_else(default_path);
        let config = Config::load(Some(config_path.as_path()))?;
        let env = std::env::var(BASE_URL_ENV).ok();
        let (base_url, base_url_source) =
            config.resolve_base_url(args.base_url.as_deref(), env.as_deref());
        log::debug!("Using backend {} (from {})", base_url, base_url_source);

        Ok(Self {
            config,
            config_path,
            base_url,
            base_url_source,
            quiet: args.quiet,
        })
    }

    pub fn client(&self) -> Result<GenerationClient, ClientError> {
        let timeout = self.config.request_timeout().unwrap_or(DEFAULT_TIMEOUT);
        GenerationClient::with_timeout(self.base_url.clone(), timeout)
    }

    pub fn session(&self) -> Result<Session<ConsoleSink>, ClientError> {
        let poller = Poller::new(PollConfig::from(&self.config.poll));
        Ok(Session::with_poller(self.client()?, poller, self.sink()))
    }

    pub fn sink(&self) -> ConsoleSink {
        if self.quiet {
            ConsoleSink::quiet()
        } else {
            ConsoleSink::new()
        }
    }
}

/// Dispatch a parsed command line.
pub async fn run(args: Args) -> Result<(), CliError> {
    let context = Context::load(&args)?;
    let form = args.command.form_input().unwrap_or_default();

    match args.command {
        Command::Generate {
            no_wait, output, ..
        } => {
            let mut session = context.session()?;
            // Informational only; a dead health endpoint does not stop the job.
            session.health_check().await;

            if no_wait {
                let submission = session.submit(&form).await.map_err(CliError::Reported)?;
                if let Submission::Queued(job) = submission {
                    println!("Job id: {}", job.id);
                    println!("Follow it with: vidgen status {} --watch", job.id);
                }
                return Ok(());
            }

            let outcome = session.run(&form).await.map_err(CliError::Reported)?;
            finish(&session, outcome, output.as_deref()).await
        }
        Command::Status { job_id, watch } => {
            if watch {
                let mut session = context.session()?;
                let outcome = session.track(&job_id).await.map_err(CliError::Reported)?;
                return finish(&session, outcome, None).await;
            }

            let response = context.client()?.status(&job_id).await?;
            println!("Status: {}", response.status);
            if let Some(url) = response.video_url {
                println!("Video: {}", url);
            }
            if let Some(error) = response.error {
                println!("Error: {}", error);
            }
            Ok(())
        }
        Command::Health => {
            println!("{}", context.client()?.health_check().await);
            Ok(())
        }
        Command::Config { action } => handle_config_action(&context, action),
    }
}

async fn finish<K: StatusSink, D: Delay>(
    session: &Session<K, D>,
    outcome: RunOutcome,
    output: Option<&Path>,
) -> Result<(), CliError> {
    if !outcome.is_success() {
        return Err(CliError::Unfinished(outcome));
    }

    if let (RunOutcome::Completed { video_url: Some(url) }, Some(dest)) = (&outcome, output) {
        let path = session.client().download_video(url, dest).await?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(context: &Context, action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!(
                "  Backend: {} (from {})",
                context.base_url, context.base_url_source
            );
            println!(
                "  Request timeout: {:?}",
                context.config.request_timeout().unwrap_or(DEFAULT_TIMEOUT)
            );
            println!(
                "  Polling: {} attempts, {}s apart",
                context.config.poll.max_attempts, context.config.poll.interval_secs
            );
            println!();

            if context.config_path.exists() {
                println!("Config file: {} (exists)", context.config_path.display());
            } else {
                println!("Config file: {} (not found)", context.config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            let path = &context.config_path;
            if path.exists() {
                return Err(CliError::Failed(format!(
                    "config file already exists: {}",
                    path.display()
                )));
            }
            write_default_config(path)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", context.config_path.display());
            Ok(())
        }
        ConfigAction::SetBaseUrl { url } => {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(CliError::Failed("base URL cannot be empty".to_string()));
            }
            let mut config = context.config.clone();
            config.backend.base_url = Some(url.to_string());
            config.save(&context.config_path)?;
            println!(
                "Saved backend {} to {}",
                url,
                context.config_path.display()
            );
            Ok(())
        }
    }
}

fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error = |e: std::io::Error| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(io_error)
}
