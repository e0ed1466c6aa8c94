use clap::Parser;
use vidgen_client::cli::{self, Args};

/// Load .env file, don't override existing env vars.
///
/// dotenv::dotenv() returns Err if .env doesn't exist, which is fine.
fn load_env() {
    let _ = dotenv::dotenv();
}

/// Install the logger. `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_env();

    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = cli::run(args).await {
        // Session failures were already shown by the sink.
        if !e.already_reported() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
