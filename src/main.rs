use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dnssearch::cli::Args;
use dnssearch::config;
use dnssearch::engine::DnsSearchEngine;
use dnssearch::output::{self, OutputManager};
use dnssearch::pool::Shutdown;
use dnssearch::types::Config;
use dnssearch::utils;
use log::{error, info};
use std::process;

const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let config_path = args.config_path.as_deref().unwrap_or(config::DEFAULT_CONFIG_FILE);
    let mut config = config::load_config(config_path).unwrap_or_else(|e| fail(&e.to_string()));
    args.apply(&mut config);
    if let Err(e) = config::validate_config(&config) {
        fail(&e.to_string());
    }
    if !config.output.color {
        colored::control::set_override(false);
    }

    if !args.silent {
        eprintln!("{} v{}\n", "dnssearch".red(), dnssearch::VERSION);
    }

    let engine = DnsSearchEngine::new(config).unwrap_or_else(|e| fail(&e.to_string()));
    let config: &Config = engine.config();

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let words = utils::read_wordlist(&config.wordlist).unwrap_or_else(|e| fail(&e.to_string()));
    info!("Loaded {} words from {}", words.len(), config.wordlist.display());

    let wildcard = engine.detect_wildcard().await;
    if let Some(signature) = &wildcard {
        if !args.silent {
            eprintln!("Detected Wildcard : {}\n", signature);
        }
    }

    let sink = OutputManager::new(config.output.clone(), config.records)?;
    let stats = engine
        .run_with_wildcard(words, wildcard, sink, shutdown.clone())
        .await?;

    let interrupted = shutdown.is_triggered();
    if !args.silent {
        if interrupted {
            eprintln!("{}", "\nINTERRUPTED".red());
        } else {
            eprintln!("{}", "\nDONE".green());
        }
    }
    output::print_stats(&stats, &config.output, args.silent, interrupted);

    if interrupted {
        process::exit(EXIT_INTERRUPTED);
    }
    Ok(())
}

fn fail(message: &str) -> ! {
    error!("{}", message);
    process::exit(1);
}

/// First signal stops dispatching, a second one exits right away.
fn spawn_signal_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        for _ in 0..2 {
            if let Err(e) = wait_for_signal().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            if shutdown.is_triggered() {
                process::exit(EXIT_INTERRUPTED);
            }
            eprintln!("{}", "\nINTERRUPTING ...".red());
            shutdown.trigger();
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
