use anyhow::{Context, Result};
use clap::Parser;
use fortune_proxy::app::App;
use fortune_proxy::models::Config;
use fortune_proxy::server;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "fortune-proxy")]
#[command(about = "Serve AI fortune-telling readings over HTTP")]
struct CliArgs {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Optional directory of static files (the web UI) to serve.
    #[arg(long, env = "STATIC_DIR", value_name = "DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fortune_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fortune-proxy");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = Arc::new(App::from_config(&config));
    let mut router = server::router(app, config.max_body_bytes);
    if let Some(dir) = &args.static_dir {
        router = server::with_static_dir(router, dir);
    }

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    server::serve(listener, router).await?;
    Ok(())
}
