use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use identity_resolver::config::{self, ConfigBuilder};
use identity_resolver::observability::init_logging;
use identity_resolver::transport::run_http;
use identity_resolver::{IdentityService, JwtDecoder};

#[derive(Parser, Debug)]
#[command(name = "identity-resolver")]
#[command(about = "Resolves the caller identity from access and id token cookies", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable authentication and serve the static development identity
    #[arg(long)]
    no_auth: bool,

    /// Claim carrying the user's roles
    #[arg(long)]
    user_roles_claim: Option<String>,

    /// HTTP bind host [default: 127.0.0.1]
    #[arg(long)]
    http_host: Option<IpAddr>,

    /// HTTP bind port [default: 8080]
    #[arg(long)]
    http_port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable JSON logging output
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn into_builder(self) -> ConfigBuilder {
        let mut builder = ConfigBuilder::new()
            .auth_enabled(!self.no_auth)
            .json_logs(self.json_logs);

        if let Some(host) = self.http_host {
            builder = builder.http_host(host);
        }

        if let Some(port) = self.http_port {
            builder = builder.http_port(port);
        }

        if let Some(claim) = self.user_roles_claim {
            builder = builder.user_roles_claim(claim);
        }

        if self.verbose {
            builder = builder.log_level("debug".to_string());
        }

        builder
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config_path = args.config.clone();

    // Precedence: env > file > CLI > defaults
    let builder = if let Some(ref path) = config_path {
        config::load_config_from_path(path, args.into_builder())?
    } else {
        config::load_config(args.into_builder())?
    };

    let config = builder.build()?;

    init_logging(&config.telemetry);

    let decoder = JwtDecoder::from_config(config.jwt.clone())?;
    let service = IdentityService::new(config.identity.clone(), Arc::new(decoder));

    tracing::info!("Starting identity resolver");
    tracing::info!("Authentication enabled: {}", config.identity.auth_enabled);
    tracing::info!("Role claim: {}", config.identity.user_roles_claim);
    tracing::info!("JWT settings: {:?}", config.jwt);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
        tracing::info!("Shutdown signal received");
    };

    run_http(service, &config, shutdown).await?;
    Ok(())
}
