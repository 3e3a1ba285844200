//! minerforge CLI and HTTP server entry point.
//!
//! Binary name: `mforge`
//!
//! Parses CLI arguments, loads the builder config, then dispatches to the
//! requested command or starts the ISO builder HTTP server.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;
use clap_complete::generate;

use minerforge_core::build::sweeper::spawn_sweeper;
use minerforge_infra::config::{load_builder_config, resolve_config_path};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,minerforge_core=debug,minerforge_infra=debug",
        _ => "trace",
    };
    minerforge_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need a config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mforge", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = load_builder_config(&config_path).await;

    let result = match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config, cli.quiet).await
        }

        Commands::Validate { file } => cli::validate::validate_request(&config, &file, cli.json).await,

        Commands::Config => cli::config::show_config(&config, &config_path, cli.json),

        Commands::Completions { .. } => Ok(()),
    };

    minerforge_observe::tracing_setup::shutdown_tracing();
    result
}

/// Run the HTTP server until Ctrl+C or SIGTERM, then stop background tasks.
async fn serve(config: minerforge_types::config::BuilderConfig, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let sweep_period = Duration::from_secs(config.sweep_interval_secs.max(1));

    let state = AppState::init(config).await?;
    let sweeper = spawn_sweeper(
        state.build_service.clone(),
        sweep_period,
        state.shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "ISO builder listening");

    if !quiet {
        println!();
        println!(
            "  {} minerforge ISO builder listening on {}",
            console::style("⛏").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!(
            "  {} {}",
            console::style("Build script:").dim(),
            state.config.script_path().display()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let shutdown = state.shutdown.clone();
    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "build sweeper task ended abnormally");
    }

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
