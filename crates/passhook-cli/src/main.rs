//! Passhook - password import inline hook
//!
//! Verifies credentials submitted by the identity provider against an LDAP
//! directory or the Active Directory domain of this host.

use anyhow::Context;
use clap::{Parser, Subcommand};
use passhook_auth::select_validator;
use passhook_core::config::{LoggingConfig, PasshookConfig};
use passhook_server::{MetricsRecorder, PasshookServer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "passhook")]
#[command(author = "Passhook Team")]
#[command(version = passhook_core::VERSION)]
#[command(about = "Password import inline hook for LDAP and Active Directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PASSHOOK_CONFIG")]
    config: Option<String>,

    /// Bind address
    #[arg(long, env = "PASSHOOK_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "PASSHOOK_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PASSHOOK_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the hook server
    Server,

    /// Show version information
    Version,

    /// Load the configuration, select the validator and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Some(Commands::Version) = cli.command {
        println!("passhook {}", passhook_core::VERSION);
        return Ok(());
    }

    let mut config = PasshookConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);

    config.hook.validate()?;
    let validator = select_validator(&config)?;

    match cli.command {
        Some(Commands::CheckConfig) => {
            println!(
                "Configuration OK: validating against {} on {}:{}",
                validator.backend(),
                config.server.bind_address,
                config.server.port
            );
        }
        Some(Commands::Server) | Some(Commands::Version) | None => {
            info!("Starting Passhook {}", passhook_core::VERSION);

            let metrics_enabled = config.metrics.enabled;
            let mut server = PasshookServer::new(config, validator);
            if metrics_enabled {
                server = server.with_metrics(MetricsRecorder::install()?);
                info!("Prometheus metrics initialized");
            }
            server.run().await?;
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
