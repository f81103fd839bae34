//! DoToday CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dotoday::cli::commands::{goal, init, load_config, serve};
use dotoday::cli::{Cli, Commands};
use dotoday::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => dotoday::cli::handle_error(err, cli.json),
    };

    // The server logs per configuration; one-shot commands keep stdout clean
    // for their output and only report warnings on stderr.
    let _logger = match cli.command {
        Commands::Serve(_) => match LoggerImpl::init(&LogConfig::from(&config.logging)) {
            Ok(logger) => Some(logger),
            Err(err) => dotoday::cli::handle_error(err, cli.json),
        },
        _ => {
            tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => init::execute(args, &config, cli.json).await,
        Commands::Serve(args) => serve::execute(args, &config).await,
        Commands::Goal(args) => goal::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        dotoday::cli::handle_error(err, cli.json);
    }
}
