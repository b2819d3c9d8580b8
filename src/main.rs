use clap::{Parser, Subcommand};
use std::sync::Arc;

use wa_warden::application::lifecycle::{self, Bot, EXIT_FAILURE, EXIT_OK};
use wa_warden::infrastructure::adapters::ConsoleSession;
use wa_warden::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "wa-warden")]
#[command(about = "Group chat bot with an HTTP dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (default)
    Run,
    /// Show version
    Version,
    /// Print the default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let code = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(&cli.config),
        Commands::Version => {
            println!("wa-warden v{}", env!("CARGO_PKG_VERSION"));
            EXIT_OK
        }
        Commands::InitConfig => init_config(),
    };

    std::process::exit(code);
}

fn load_config(config_path: &str) -> Result<Config, String> {
    if !std::path::Path::new(config_path).exists() {
        tracing::info!("No config file at {}, using defaults", config_path);
        return Config::load_env().map_err(|e| e.to_string());
    }

    let mut config = Config::load(config_path).map_err(|e| e.to_string())?;
    config
        .apply_env(|key| std::env::var(key).ok())
        .map_err(|e| e.to_string())?;
    Ok(config)
}

fn run_bot(config_path: &str) -> i32 {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return EXIT_FAILURE;
        }
    };

    let session = Arc::new(ConsoleSession::new(&config.bot.name, config.browser_profile()));
    lifecycle::run_blocking(Bot::new(config, session), shutdown_signal())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}

fn init_config() -> i32 {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("# Save this to config.yaml and adjust as needed.");
            EXIT_OK
        }
        Err(e) => {
            tracing::error!("Failed to render config: {}", e);
            EXIT_FAILURE
        }
    }
}
