//! tour-desk CLI server
//!
//! ```sh
//! # Run with default config (~/.config/tour-desk/config.toml)
//! tour-desk
//!
//! # Custom config path and port
//! tour-desk --config /etc/tour-desk/config.toml --api-port 8081
//!
//! # Validate config without starting
//! tour-desk --check
//!
//! # Mint a local bearer token for a profile
//! tour-desk --dev-token 6f1c...
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use tour_desk::config::{AppConfig, CONFIG_PATH_ENV};
use tour_desk::infrastructure::crypto::create_token;
use tour_desk::server::{init_tracing, ServerHandle, ServerOptions};

/// tour-desk: tour requests, calendar and analytics for agent dashboards.
#[derive(Parser, Debug)]
#[command(
    name = "tour-desk",
    version,
    about = "Tour-request backend for real-estate agent dashboards",
    long_about = "tour-desk: REST + WebSocket API behind the agent dashboard \
                  (tour requests, calendar, analytics, Realtor search).\n\n\
                  Default config: ~/.config/tour-desk/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Print a token for PROFILE_ID signed with the configured secret and exit.
    #[arg(long, value_name = "PROFILE_ID")]
    dev_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(tour_desk::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    if let Some(profile_id) = cli.dev_token {
        let token = create_token(&profile_id, None, &config.security.jwt_config())?;
        println!("{}", token);
        return Ok(());
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.api_address());
        println!("   Database    : {}", config.database.connection_url());
        println!("   Pending TTL : {}h", config.tours.pending_ttl().num_hours());
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config.logging);
    info!("Configuration loaded from {}", config_path.display());

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start tour-desk: {}", e);
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
