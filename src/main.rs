// Masquerade - Consistent PII Pseudonymization
// Copyright (c) 2025 Masquerade Contributors
// Licensed under the MIT License

use masquerade::cli::commands::EXIT_FATAL;
use masquerade::cli::{Cli, Commands};
use masquerade::config::{load_config, LoggingConfig};
use masquerade::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is not an error
    let _ = dotenvy::dotenv();

    let cli = <Cli as clap::Parser>::parse();

    // File logging follows the config when it loads; commands report load errors themselves
    let config = load_config(&cli.config).ok();
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|| LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        });

    // Data commands keep the console quiet unless a level is given
    let log_level = match (&cli.log_level, &config) {
        (Some(level), _) => level.clone(),
        (None, _) if cli.command.writes_data_to_stdout() => "warn".to_string(),
        (None, Some(c)) => c.application.log_level.clone(),
        (None, None) => "info".to_string(),
    };
    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "Masquerade - Consistent PII Pseudonymization"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(wait_for_shutdown(shutdown_tx));

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            masquerade::log_error_with_context!(&e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    drop(logging_guard);
    process::exit(exit_code);
}

/// Flip the shutdown flag on SIGINT or SIGTERM
async fn wait_for_shutdown(shutdown_tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
    }

    eprintln!("\n⚠️  Shutdown signal received, finishing the current text...");
    let _ = shutdown_tx.send(true);
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Anonymize(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Mappings(args) => args.execute(&cli.config).await,
        Commands::Stats(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::EntityTypes(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
