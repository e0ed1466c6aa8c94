//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::backend::FormInput;

/// Submit prompts to a video generation backend and follow the jobs
#[derive(Parser, Debug)]
#[command(name = "vidgen")]
#[command(version, about = "Video generation job client", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL (overrides VIDGEN_API_BASE and the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide progress lines; alerts and results are still printed
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a prompt and wait for the video
    Generate {
        /// Text prompt describing the video
        prompt: String,

        /// Model label (default: cinematic)
        #[arg(long, short)]
        model: Option<String>,

        /// Clip length in seconds (default: 5)
        #[arg(long, short)]
        duration: Option<String>,

        /// Aspect ratio: 16:9, 9:16, 1:1, 4:3, 3:4, 21:9 (default: 16:9)
        #[arg(long, short)]
        aspect: Option<String>,

        /// Return after submitting instead of polling
        #[arg(long)]
        no_wait: bool,

        /// Download the finished video to this path
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the status of a job
    Status {
        /// Job id returned by generate
        job_id: String,

        /// Keep polling until the job finishes
        #[arg(long, short)]
        watch: bool,
    },
    /// Check that the backend is reachable
    Health,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
    /// Print the config file location
    Path,
    /// Persist the backend base URL
    SetBaseUrl {
        /// New base URL, e.g. https://my-backend.example.com
        url: String,
    },
}

impl Command {
    /// Form values carried by `generate`, if this is one.
    pub fn form_input(&self) -> Option<FormInput> {
        match self {
            Command::Generate {
                prompt,
                model,
                duration,
                aspect,
                ..
            } => Some(FormInput {
                prompt: Some(prompt.clone()),
                model: model.clone(),
                duration: duration.clone(),
                aspect_ratio: aspect.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let args = Args::parse_from(["vidgen", "generate", "a fox in snow"]);
        assert!(args.base_url.is_none());
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        match args.command {
            Command::Generate {
                prompt,
                model,
                duration,
                aspect,
                no_wait,
                output,
            } => {
                assert_eq!(prompt, "a fox in snow");
                assert!(model.is_none());
                assert!(duration.is_none());
                assert!(aspect.is_none());
                assert!(!no_wait);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_generate_all_options() {
        let args = Args::parse_from([
            "vidgen",
            "generate",
            "city at night",
            "--model",
            "anime",
            "-d",
            "8",
            "--aspect",
            "9:16",
            "--no-wait",
            "-o",
            "out.mp4",
        ]);
        let form = args.command.form_input().unwrap();
        assert_eq!(form.prompt.as_deref(), Some("city at night"));
        assert_eq!(form.model.as_deref(), Some("anime"));
        assert_eq!(form.duration.as_deref(), Some("8"));
        assert_eq!(form.aspect_ratio.as_deref(), Some("9:16"));
        assert!(matches!(
            args.command,
            Command::Generate { no_wait: true, output: Some(_), .. }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "vidgen",
            "health",
            "--base-url",
            "https://api.example.com",
            "-vv",
            "-q",
        ]);
        assert_eq!(args.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(args.verbose, 2);
        assert!(args.quiet);
        assert!(matches!(args.command, Command::Health));
    }

    #[test]
    fn test_status_watch() {
        let args = Args::parse_from(["vidgen", "status", "job-42", "--watch"]);
        match args.command {
            Command::Status { job_id, watch } => {
                assert_eq!(job_id, "job-42");
                assert!(watch);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_set_base_url() {
        let args = Args::parse_from(["vidgen", "config", "set-base-url", "https://x.example"]);
        match args.command {
            Command::Config { action } => assert_eq!(
                action,
                ConfigAction::SetBaseUrl {
                    url: "https://x.example".to_string()
                }
            ),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_non_generate_has_no_form() {
        let args = Args::parse_from(["vidgen", "health"]);
        assert!(args.command.form_input().is_none());
    }

    #[test]
    fn test_generate_requires_prompt() {
        assert!(Args::try_parse_from(["vidgen", "generate"]).is_err());
    }
}
