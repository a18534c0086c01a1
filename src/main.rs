//! Pathway CLI entry point.

use clap::Parser;
use tracing::warn;

use pathway::cli::{commands, handle_error, Cli, Commands};
use pathway::domain::models::Config;
use pathway::infrastructure::config::ConfigLoader;
use pathway::infrastructure::logging::{prune_expired_logs, LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `init` writes the config, so it must not require one
    let config = match cli.command {
        Commands::Init(_) => Config::default(),
        _ => match ConfigLoader::load() {
            Ok(config) => config,
            Err(err) => handle_error(err, cli.json),
        },
    };

    let log_config = LogConfig::from(&config.logging);
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    if let Some(dir) = &log_config.log_dir {
        if let Err(error) = prune_expired_logs(dir, log_config.retention_days).await {
            warn!(%error, "log retention pruning failed");
        }
    }

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::School(args) => commands::school::execute(args, &config, cli.json).await,
        Commands::Evidence(args) => commands::evidence::execute(args, &config, cli.json).await,
        Commands::Override(args) => commands::override_cmd::execute(args, &config, cli.json).await,
        Commands::Round(args) => commands::round::execute(args, &config, cli.json).await,
        Commands::Reconcile(args) => commands::reconcile::execute(args, &config, cli.json).await,
        Commands::Certificate(args) => commands::certificate::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
