use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use request_locale::config::{Config, LoggingConfig};
use request_locale::middleware::NamedMethods;
use request_locale::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "request-locale", version, about = "Locale resolution demo server")]
struct Args {
    /// Path to config.toml (defaults to conf/config.toml or ./config.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let _guard = init_logging(&config.logging);

    // Locale discovery must succeed before any traffic is accepted
    let methods = NamedMethods::new().register("log_locale", |req, locale| {
        tracing::debug!("{} {} served in {}", req.method(), req.uri(), locale);
    });
    let state = AppState::new(&config.locale, None, &methods)
        .context("Locale setup failed")?;
    rust_i18n::set_locale(state.locale.service.get_default_locale());

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "request-locale.log".into());

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            registry.with(fmt::layer().with_ansi(false).with_writer(writer)).init();
            Some(guard)
        },
        None => {
            registry.init();
            None
        },
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
