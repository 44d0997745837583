use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::info;
use univers_proxy::config::Config;
use univers_proxy::server::router::{AppState, app_router};
use univers_proxy::upstream::Upstreams;
use univers_proxy::utils::logging::init_tracing;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    init_tracing(&cfg.basic);

    info!(
        app_name = %cfg.basic.app_name,
        app_env = %cfg.basic.app_env,
        loglevel = %cfg.basic.loglevel,
        log_format = ?cfg.basic.log_format,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );

    let upstreams = Upstreams::from_config(&cfg)?;
    let app = app_router(AppState::new(upstreams));

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
